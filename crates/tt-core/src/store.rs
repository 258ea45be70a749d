//! Character persistence: one pretty-printed JSON file per character.
//!
//! The store also generates new characters, borrowing background text from a
//! [`BackgroundGenerator`] and applying caller overrides from
//! [`CharacterOptions`].

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::background::{BackgroundGenerator, TableBackgroundGenerator};
use crate::character::Character;
use crate::error::{GameError, GameResult};

/// Palette that generated characters draw their symbol from (20 entries).
pub const CHARACTER_SYMBOLS: &[&str] = &[
    "🤖", "💾", "🔌", "⚡", "🖥️", "📡", "🎭", "💀", "⚔️", "🔮", "💊", "🚁", "🌃", "🔥", "❄️",
    "⭐", "💰", "🎯", "🗲", "🔊",
];

/// Overrides applied when generating a character.
///
/// Every field left as `None` falls back to its documented default.
#[derive(Debug, Clone, Default)]
pub struct CharacterOptions {
    /// Character name. Default: `Unknown_NNNN` with NNNN in 1000..=9999.
    pub name: Option<String>,
    /// Display symbol. Default: random entry of [`CHARACTER_SYMBOLS`].
    pub symbol: Option<String>,
    /// Archetype label. Default: the background generator's suggestion.
    pub archetype: Option<String>,
    /// Maximum hit points. Default: 6.
    pub max_hp: Option<u32>,
    /// Starting cash. Default: 0.
    pub cash: Option<i64>,
    /// Physical description. Default: empty.
    pub physical_description: Option<String>,
    /// Goals. Default: empty.
    pub goals: Option<String>,
    /// Player-controlled instead of NPC. Default: false.
    pub player_control: bool,
}

impl CharacterOptions {
    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the archetype.
    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Set the maximum hit points.
    pub fn with_max_hp(mut self, max_hp: u32) -> Self {
        self.max_hp = Some(max_hp);
        self
    }

    /// Set the starting cash.
    pub fn with_cash(mut self, cash: i64) -> Self {
        self.cash = Some(cash);
        self
    }

    /// Set the physical description.
    pub fn with_physical_description(mut self, description: impl Into<String>) -> Self {
        self.physical_description = Some(description.into());
        self
    }

    /// Set the goals.
    pub fn with_goals(mut self, goals: impl Into<String>) -> Self {
        self.goals = Some(goals.into());
        self
    }
}

/// Loads, saves, lists, deletes, and generates characters in one directory.
pub struct CharacterStore<G = TableBackgroundGenerator> {
    dir: PathBuf,
    generator: G,
}

impl CharacterStore {
    /// Create a store over `dir` using the bundled table generator.
    ///
    /// The directory is created on the first export, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_generator(dir, TableBackgroundGenerator::new())
    }
}

impl<G: BackgroundGenerator> CharacterStore<G> {
    /// Create a store over `dir` with a custom background generator.
    pub fn with_generator(dir: impl Into<PathBuf>, generator: G) -> Self {
        Self {
            dir: dir.into(),
            generator,
        }
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a character with a background, applying the overrides.
    pub fn generate(&mut self, options: CharacterOptions, rng: &mut StdRng) -> Character {
        let background = self.generator.generate(rng);

        let name = options
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Unknown_{}", rng.random_range(1000..=9999)));
        let symbol = options.symbol.unwrap_or_else(|| {
            CHARACTER_SYMBOLS[rng.random_range(0..CHARACTER_SYMBOLS.len())].to_string()
        });
        let archetype = options
            .archetype
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(background.archetype);

        let mut character = Character::new(name);
        character.set_symbol(symbol);
        character.set_archetype(archetype);
        character.set_background(background.description);
        character.set_player_control(options.player_control);
        if let Some(max_hp) = options.max_hp {
            character.set_max_hp(max_hp);
            character.set_current_hp(character.max_hp());
        }
        if let Some(cash) = options.cash {
            character.set_cash(cash);
        }
        if let Some(description) = options.physical_description {
            character.set_physical_description(description);
        }
        if let Some(goals) = options.goals {
            character.set_goals(goals);
        }
        character
    }

    /// Generate a player-controlled character.
    pub fn create_player(
        &mut self,
        name: impl Into<String>,
        options: CharacterOptions,
        rng: &mut StdRng,
    ) -> Character {
        let options = CharacterOptions {
            name: Some(name.into()),
            player_control: true,
            ..options
        };
        self.generate(options, rng)
    }

    /// Generate a computer-controlled character.
    pub fn create_npc(&mut self, options: CharacterOptions, rng: &mut StdRng) -> Character {
        let options = CharacterOptions {
            player_control: false,
            ..options
        };
        self.generate(options, rng)
    }

    /// Write a character to `filename` (or its default filename). Overwrites.
    pub fn export(&self, character: &Character, filename: Option<&str>) -> GameResult<PathBuf> {
        let filename = filename.map_or_else(|| default_filename(character.name()), str::to_string);
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        let json = serde_json::to_string_pretty(character)?;
        fs::write(&path, json)?;
        debug!(character = character.name(), path = %path.display(), "exported character");
        Ok(path)
    }

    /// Read a character from `filename` in the storage directory.
    pub fn load(&self, filename: &str) -> GameResult<Character> {
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(GameError::CharacterNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        let character = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded character");
        Ok(character)
    }

    /// Sorted filenames of all saved characters. Empty if the directory is missing.
    pub fn list(&self) -> GameResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete a saved character. Returns false if there was nothing to delete.
    pub fn delete(&self, filename: &str) -> GameResult<bool> {
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        debug!(path = %path.display(), "deleted character");
        Ok(true)
    }
}

/// Default filename for a character: lowercased, spaces replaced, `.json`.
pub fn default_filename(name: &str) -> String {
    format!("{}.json", name.replace(' ', "_").to_lowercase())
}
