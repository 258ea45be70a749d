//! Configuration for a game session.

use std::path::PathBuf;

/// Default directory for exported character files.
pub const DEFAULT_CHARACTERS_DIR: &str = "rendered_character";

/// Default directory for event template files.
pub const DEFAULT_TEMPLATES_DIR: &str = "event_templates";

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible template and character rolls.
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Directory holding one JSON file per event template.
    pub templates_dir: PathBuf,
    /// Directory holding one JSON file per character.
    pub characters_dir: PathBuf,
    /// Write the built-in templates when the template directory is empty.
    pub seed_default_templates: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            characters_dir: PathBuf::from(DEFAULT_CHARACTERS_DIR),
            seed_default_templates: true,
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the template directory.
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the character directory.
    pub fn with_characters_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.characters_dir = dir.into();
        self
    }

    /// Leave an empty template directory empty.
    pub fn without_default_templates(mut self) -> Self {
        self.seed_default_templates = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.templates_dir, PathBuf::from("event_templates"));
        assert_eq!(cfg.characters_dir, PathBuf::from("rendered_character"));
        assert!(cfg.seed_default_templates);
    }

    #[test]
    fn builder_methods() {
        let cfg = SessionConfig::default()
            .with_seed(7)
            .with_templates_dir("t")
            .with_characters_dir("c")
            .without_default_templates();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.templates_dir, PathBuf::from("t"));
        assert_eq!(cfg.characters_dir, PathBuf::from("c"));
        assert!(!cfg.seed_default_templates);
    }
}
