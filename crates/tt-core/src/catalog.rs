//! The template catalog: every `*.json` file in one directory, keyed by id.
//!
//! Loading never fails as a whole. A file that cannot be read or parsed is
//! logged and skipped so one bad template cannot hide the rest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::error::GameResult;
use crate::template::{EventTemplate, default_templates};

/// Event templates loaded from a directory.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dir: PathBuf,
    templates: BTreeMap<String, EventTemplate>,
}

impl TemplateCatalog {
    /// An empty catalog over `dir`. Nothing is read until [`load_all`](Self::load_all).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            templates: BTreeMap::new(),
        }
    }

    /// Create `dir` if needed and load every template in it.
    pub fn open(dir: impl Into<PathBuf>) -> GameResult<Self> {
        let mut catalog = Self::new(dir);
        fs::create_dir_all(&catalog.dir)?;
        catalog.load_all();
        Ok(catalog)
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-scan the directory, replacing the in-memory catalog.
    /// Returns the number of templates loaded.
    pub fn load_all(&mut self) -> usize {
        self.templates.clear();

        for path in self.template_files() {
            match read_template(&path) {
                Ok(template) => {
                    debug!(id = %template.id, path = %path.display(), "loaded template");
                    self.templates.insert(template.id.clone(), template);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable template");
                }
            }
        }

        info!(count = self.templates.len(), dir = %self.dir.display(), "template catalog loaded");
        self.templates.len()
    }

    /// Write the built-in templates if the directory holds no template files.
    /// Returns the number written.
    pub fn seed_defaults(&mut self) -> GameResult<usize> {
        if !self.template_files().is_empty() {
            return Ok(0);
        }
        let defaults = default_templates();
        let count = defaults.len();
        for template in defaults {
            self.save(template)?;
        }
        info!(count, "seeded default templates");
        Ok(count)
    }

    /// Validate and write a template as `{id}.json`, replacing any entry with
    /// the same id.
    pub fn save(&mut self, template: EventTemplate) -> GameResult<PathBuf> {
        template.validate()?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", template.id));
        fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        debug!(id = %template.id, path = %path.display(), "saved template");
        self.templates.insert(template.id.clone(), template);
        Ok(path)
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&EventTemplate> {
        self.templates.get(id)
    }

    /// All template ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// All templates, sorted by id.
    pub fn templates(&self) -> impl Iterator<Item = &EventTemplate> {
        self.templates.values()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Pick a template uniformly at random.
    ///
    /// With a non-empty `tags`, only templates sharing at least one tag are
    /// candidates. Returns `None` when nothing qualifies.
    pub fn random(&self, tags: &[String], rng: &mut StdRng) -> Option<&EventTemplate> {
        let candidates: Vec<&EventTemplate> = self
            .templates
            .values()
            .filter(|t| tags.is_empty() || t.has_any_tag(tags))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }

    fn template_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    }
}

fn read_template(path: &Path) -> GameResult<EventTemplate> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
