//! Executed event records and per-template trigger statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::template::EventTemplate;

/// One concrete execution of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Id of the executed template.
    pub template_id: String,
    /// Template name at execution time.
    pub template_name: String,
    /// Description of the event as it played out.
    pub contextualized_description: String,
    /// Resolved outcome, filled in by the game master.
    pub outcome: String,
    /// Changes applied to characters during resolution, by character name.
    pub character_changes: BTreeMap<String, Vec<String>>,
    /// When the event was executed.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// The player input that triggered the event.
    pub player_action: String,
    /// 1-based position in the session history.
    pub event_number: u32,
}

impl GameEvent {
    /// A fresh, unresolved execution of `template`.
    pub fn from_template(
        template: &EventTemplate,
        player_action: impl Into<String>,
        event_number: u32,
    ) -> Self {
        Self {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            contextualized_description: template.description.clone(),
            outcome: String::new(),
            character_changes: BTreeMap::new(),
            timestamp: Utc::now(),
            player_action: player_action.into(),
            event_number,
        }
    }

    /// Record a change against a character.
    pub fn note_change(&mut self, character: impl Into<String>, change: impl Into<String>) {
        self.character_changes
            .entry(character.into())
            .or_default()
            .push(change.into());
    }
}

/// Running trigger statistics for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
    /// Template name.
    pub name: String,
    /// How many recorded events used the template.
    pub count: u32,
    /// When the template was last triggered.
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub last_triggered: Option<DateTime<Utc>>,
}

impl EventStats {
    /// Statistics for a template that has not been triggered yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            last_triggered: None,
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| text.parse::<NaiveDateTime>().ok().map(|t| t.and_utc()))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{text}'")))
}

fn deserialize_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{text}'"))),
        None => Ok(None),
    }
}
