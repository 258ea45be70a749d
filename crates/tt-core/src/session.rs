//! Game session state.
//!
//! `GameSession` owns the characters in play, the template catalog, the
//! append-only event history with its statistics, and the story log. The
//! whole session (minus the catalog, which lives in its own directory) can be
//! snapshotted to a single JSON file and restored from it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::TemplateCatalog;
use crate::character::Character;
use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::{EventStats, GameEvent};
use crate::store::{CharacterOptions, CharacterStore};
use crate::template::EventTemplate;

/// The full mutable state of one play-through.
pub struct GameSession {
    characters: BTreeMap<String, Character>,
    catalog: TemplateCatalog,
    store: CharacterStore,
    event_history: Vec<GameEvent>,
    story_log: Vec<String>,
    event_stats: BTreeMap<String, EventStats>,
    current_event: Option<GameEvent>,
    rng: StdRng,
}

impl GameSession {
    /// Open the template catalog and character store named by `config`.
    ///
    /// An empty template directory is seeded with the built-in templates
    /// unless the config opts out.
    pub fn new(config: SessionConfig) -> GameResult<Self> {
        let mut catalog = TemplateCatalog::open(&config.templates_dir)?;
        if config.seed_default_templates {
            catalog.seed_defaults()?;
        }
        let store = CharacterStore::new(&config.characters_dir);
        Ok(Self::with_parts(catalog, store, config.seed))
    }

    /// Assemble a session from an already-loaded catalog and store.
    pub fn with_parts(catalog: TemplateCatalog, store: CharacterStore, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            characters: BTreeMap::new(),
            catalog,
            store,
            event_history: Vec::new(),
            story_log: Vec::new(),
            event_stats: BTreeMap::new(),
            current_event: None,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The template catalog.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Mutable access to the template catalog.
    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }

    /// The character store.
    pub fn store(&self) -> &CharacterStore {
        &self.store
    }

    /// Events executed so far, oldest first.
    pub fn event_history(&self) -> &[GameEvent] {
        &self.event_history
    }

    /// The narrative log, oldest first.
    pub fn story_log(&self) -> &[String] {
        &self.story_log
    }

    /// Trigger statistics by template id.
    pub fn event_stats(&self) -> &BTreeMap<String, EventStats> {
        &self.event_stats
    }

    /// The most recently executed event, unless cleared.
    pub fn current_event(&self) -> Option<&GameEvent> {
        self.current_event.as_ref()
    }

    /// The session RNG.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Put a character into play, replacing any character with the same name.
    pub fn add_character(&mut self, character: Character) -> Option<Character> {
        self.characters
            .insert(character.name().to_string(), character)
    }

    /// Take a character out of play. Saved files are untouched.
    pub fn remove_character(&mut self, name: &str) -> Option<Character> {
        self.characters.remove(name)
    }

    /// Look up a character by name.
    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// Look up a character by name for mutation.
    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.get_mut(name)
    }

    /// All characters in play, sorted by name.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Number of characters in play.
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Generate an NPC with the session RNG and put it into play.
    pub fn spawn_npc(&mut self, options: CharacterOptions) -> &Character {
        let npc = self.store.create_npc(options, &mut self.rng);
        let name = npc.name().to_string();
        self.characters.insert(name.clone(), npc);
        &self.characters[&name]
    }

    /// Generate a player character with the session RNG and put it into play.
    pub fn spawn_player(&mut self, name: &str, options: CharacterOptions) -> &Character {
        let player = self.store.create_player(name, options, &mut self.rng);
        let name = player.name().to_string();
        self.characters.insert(name.clone(), player);
        &self.characters[&name]
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Pick a random template, optionally restricted to `tags`.
    pub fn random_template(&mut self, tags: &[String]) -> Option<EventTemplate> {
        self.catalog.random(tags, &mut self.rng).cloned()
    }

    /// Execute a template: append an unresolved event, make it current, and
    /// bump the template's statistics. Unknown ids change nothing.
    pub fn record_event(&mut self, template_id: &str, player_action: &str) -> GameResult<&GameEvent> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| GameError::TemplateNotFound(template_id.to_string()))?;

        let event_number = self.event_history.len() as u32 + 1;
        let event = GameEvent::from_template(template, player_action, event_number);

        let stats = self
            .event_stats
            .entry(template.id.clone())
            .or_insert_with(|| EventStats::new(template.name.clone()));
        stats.count += 1;
        stats.last_triggered = Some(event.timestamp);

        debug!(template = template_id, event_number, "recorded event");
        self.current_event = Some(event.clone());
        self.event_history.push(event);
        Ok(&self.event_history[self.event_history.len() - 1])
    }

    /// Set the outcome of the current event.
    pub fn record_outcome(&mut self, outcome: &str) -> GameResult<()> {
        let number = self
            .current_event
            .as_ref()
            .map(|e| e.event_number)
            .ok_or(GameError::NoCurrentEvent)?;
        self.update_current(number, |e| e.outcome = outcome.to_string());
        Ok(())
    }

    /// Record a character change against the current event. Without a
    /// current event there is nothing to attach it to and the call is a no-op.
    pub fn note_change(&mut self, character: &str, change: &str) {
        if let Some(number) = self.current_event.as_ref().map(|e| e.event_number) {
            self.update_current(number, |e| e.note_change(character, change));
        }
    }

    /// Forget the current event without touching the history.
    pub fn clear_current_event(&mut self) {
        self.current_event = None;
    }

    /// Undo the most recent event's bookkeeping and return it.
    ///
    /// The event leaves the history, its template's count drops (the stats
    /// entry goes away at zero), the current event is cleared if it was this
    /// one, and the last player/GM pair is dropped from the story log.
    /// Character changes made while resolving the event are not reverted.
    pub fn undo_last(&mut self) -> GameResult<GameEvent> {
        let last = self.event_history.pop().ok_or(GameError::EmptyHistory)?;

        if let Some(stats) = self.event_stats.get_mut(&last.template_id) {
            stats.count = stats.count.saturating_sub(1);
            if stats.count == 0 {
                self.event_stats.remove(&last.template_id);
            }
        }

        if self
            .current_event
            .as_ref()
            .is_some_and(|e| e.event_number == last.event_number)
        {
            self.current_event = None;
        }

        if self.story_log.len() >= 2 {
            self.story_log.truncate(self.story_log.len() - 2);
        }

        debug!(event_number = last.event_number, "undid event");
        Ok(last)
    }

    fn update_current(&mut self, number: u32, mut apply: impl FnMut(&mut GameEvent)) {
        if let Some(current) = self.current_event.as_mut() {
            apply(current);
        }
        if let Some(recorded) = self
            .event_history
            .iter_mut()
            .rev()
            .find(|e| e.event_number == number)
        {
            apply(recorded);
        }
    }

    // -----------------------------------------------------------------------
    // Story log
    // -----------------------------------------------------------------------

    /// Log one turn: the player's input and the game master's reply.
    pub fn append_exchange(&mut self, player_input: &str, gm_response: &str) {
        self.story_log.push(format!("Player: {player_input}"));
        self.story_log.push(format!("GM: {gm_response}"));
    }

    /// Append a free-form entry to the story log.
    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.story_log.push(entry.into());
    }

    /// Empty the story log.
    pub fn clear_story(&mut self) {
        self.story_log.clear();
    }

    // -----------------------------------------------------------------------
    // Summaries
    // -----------------------------------------------------------------------

    /// Roster of every character in play.
    pub fn roster(&self) -> String {
        if self.characters.is_empty() {
            return "No characters in the game".to_string();
        }
        let mut out = format!("CHARACTERS IN GAME:\n{}\n", "=".repeat(30));
        for character in self.characters.values() {
            out.push('\n');
            out.push_str(&character.summary_line());
            out.push('\n');
        }
        out
    }

    /// Trigger counts per template and the current event.
    pub fn event_statistics(&self) -> String {
        if self.event_stats.is_empty() {
            return "No events have been triggered yet.".to_string();
        }
        let mut out = format!("EVENT STATISTICS\n{}\n", "=".repeat(40));
        out.push_str(&format!(
            "Total Events Executed: {}\n\n",
            self.event_history.len()
        ));
        for (id, stats) in &self.event_stats {
            out.push_str(&format!("• {} ({id}): {} times\n", stats.name, stats.count));
        }
        if let Some(current) = &self.current_event {
            out.push_str(&format!(
                "\nCurrent Event: #{} - {}\n",
                current.event_number, current.template_name
            ));
        }
        out
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write a snapshot of the session to `path`, overwriting it.
    pub fn save_to(&self, path: &Path) -> GameResult<()> {
        let snapshot = SnapshotRef {
            characters: &self.characters,
            event_history: &self.event_history,
            story_log: &self.story_log,
            event_stats: &self.event_stats,
            current_event: self.current_event.as_ref(),
        };
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        info!(path = %path.display(), events = self.event_history.len(), "saved session");
        Ok(())
    }

    /// Replace the session state with the snapshot at `path`.
    ///
    /// On error the current state is left as it was.
    pub fn load_from(&mut self, path: &Path) -> GameResult<()> {
        let content = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        self.characters = snapshot.characters;
        self.event_history = snapshot.event_history;
        self.story_log = snapshot.story_log;
        self.event_stats = snapshot.event_stats;
        self.current_event = snapshot.current_event;

        info!(path = %path.display(), events = self.event_history.len(), "loaded session");
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    characters: &'a BTreeMap<String, Character>,
    event_history: &'a [GameEvent],
    story_log: &'a [String],
    event_stats: &'a BTreeMap<String, EventStats>,
    current_event: Option<&'a GameEvent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Snapshot {
    characters: BTreeMap<String, Character>,
    event_history: Vec<GameEvent>,
    story_log: Vec<String>,
    event_stats: BTreeMap<String, EventStats>,
    current_event: Option<GameEvent>,
}
