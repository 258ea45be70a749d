//! Event templates: static definitions of events the game master can run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// How hard an event is meant to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Low stakes.
    Easy,
    /// The default.
    #[default]
    Medium,
    /// Dangerous.
    Hard,
}

impl Difficulty {
    /// All difficulty tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parse a tier name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Lowercase name as stored in template files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable event definition, not yet bound to characters or outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    /// Unique identifier; also the file stem.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What happens.
    pub description: String,
    /// Keywords in player input that suggest this event.
    pub triggers: Vec<String>,
    /// Outcomes the game master may choose from.
    pub possible_outcomes: Vec<String>,
    /// Tool names the resolution is expected to use. Advisory only.
    pub required_tools: Vec<String>,
    /// Hints for the game master when contextualizing the event.
    pub context_hints: Vec<String>,
    /// Difficulty tier.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Free-text tags used for filtered random selection.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl EventTemplate {
    /// Create a template with empty lists and medium difficulty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            triggers: Vec::new(),
            possible_outcomes: Vec::new(),
            required_tools: Vec::new(),
            context_hints: Vec::new(),
            difficulty: Difficulty::default(),
            tags: Vec::new(),
        }
    }

    /// Whether any of `tags` appears in this template's tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(t))
    }

    /// Check the authoring rules: id, name, and description are required and
    /// the id must be a plain file stem.
    pub fn validate(&self) -> GameResult<()> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(GameError::InvalidTemplate("template id is required".into()));
        }
        if id != self.id {
            return Err(GameError::InvalidTemplate(format!(
                "template id '{}' has surrounding whitespace",
                self.id
            )));
        }
        if id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(GameError::InvalidTemplate(format!(
                "template id '{id}' cannot be used as a file name"
            )));
        }
        if self.name.trim().is_empty() {
            return Err(GameError::InvalidTemplate("template name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(GameError::InvalidTemplate(
                "template description is required".into(),
            ));
        }
        Ok(())
    }
}

/// The templates written into an empty catalog.
pub fn default_templates() -> Vec<EventTemplate> {
    vec![
        EventTemplate {
            id: "treasure_find".into(),
            name: "Treasure Discovery".into(),
            description: "The party discovers a hidden cache of valuable items. The treasure could contain cash, equipment, or mysterious artifacts.".into(),
            triggers: strings(&["exploring", "searching", "investigating"]),
            possible_outcomes: strings(&["Find cash", "Find equipment", "Find magical item", "Trap triggers"]),
            required_tools: strings(&["modify_character_cash", "add_item_to_inventory", "modify_character_hp"]),
            context_hints: strings(&["Consider what the player was doing", "Match treasure to location", "Some treasures might be trapped"]),
            difficulty: Difficulty::Easy,
            tags: strings(&["exploration", "reward", "discovery"]),
        },
        EventTemplate {
            id: "combat_encounter".into(),
            name: "Combat Encounter".into(),
            description: "Hostile enemies appear and engage the party in combat. The outcome depends on the party's skills and tactics.".into(),
            triggers: strings(&["fighting", "attacking", "confronting"]),
            possible_outcomes: strings(&["Victory with no casualties", "Victory with injuries", "Retreat", "Defeat"]),
            required_tools: strings(&["modify_character_hp", "set_character_condition", "modify_character_cash"]),
            context_hints: strings(&["Consider party strength", "Match enemy to location", "Injuries should be realistic"]),
            difficulty: Difficulty::Hard,
            tags: strings(&["combat", "danger", "challenge"]),
        },
        EventTemplate {
            id: "skill_challenge".into(),
            name: "Skill Challenge".into(),
            description: "The party faces a challenge that requires specific skills or knowledge to overcome successfully.".into(),
            triggers: strings(&["attempting", "trying", "solving"]),
            possible_outcomes: strings(&["Success", "Partial success", "Failure with consequences", "Learn new skill"]),
            required_tools: strings(&["learn_character_skill", "modify_character_hp", "add_item_to_inventory"]),
            context_hints: strings(&["Match challenge to player action", "Reward creativity", "Failure should teach something"]),
            difficulty: Difficulty::Medium,
            tags: strings(&["challenge", "skill", "learning"]),
        },
        EventTemplate {
            id: "social_encounter".into(),
            name: "Social Encounter".into(),
            description: "The party meets NPCs who may become allies, enemies, or sources of information and opportunities.".into(),
            triggers: strings(&["talking", "negotiating", "meeting"]),
            possible_outcomes: strings(&["Gain ally", "Make enemy", "Get information", "Receive quest", "Trade opportunity"]),
            required_tools: strings(&["modify_character_cash", "add_item_to_inventory", "learn_character_skill"]),
            context_hints: strings(&["NPCs should have motivations", "Social outcomes depend on approach", "Information should be useful"]),
            difficulty: Difficulty::Easy,
            tags: strings(&["social", "npc", "roleplay"]),
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
