//! Tools the game master model can call.
//!
//! Every tool is a variant of [`ToolCall`]. A model request is parsed into a
//! variant by name and JSON arguments, then applied to the session. The
//! result is always a human-readable string that goes back to the model;
//! lookup misses are reported in that string rather than as errors.

use serde_json::{Value, json};
use tracing::debug;
use tt_core::{GameError, GameSession};

use crate::error::{AgentError, AgentResult};

/// A parsed tool request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// Render a character sheet.
    GetCharacterInfo {
        /// Character name.
        name: String,
    },
    /// Heal (positive change) or damage (zero or negative change) a character.
    ModifyCharacterHp {
        /// Character name.
        name: String,
        /// Signed HP change.
        change: i64,
    },
    /// Add or remove cash.
    ModifyCharacterCash {
        /// Character name.
        name: String,
        /// Signed cash change.
        change: i64,
    },
    /// Add an item to an inventory.
    AddItemToInventory {
        /// Character name.
        name: String,
        /// Item to add.
        item: String,
    },
    /// Remove the first matching item from an inventory.
    RemoveItemFromInventory {
        /// Character name.
        name: String,
        /// Item to remove.
        item: String,
    },
    /// Set a status condition.
    SetCharacterCondition {
        /// Character name.
        name: String,
        /// Condition text, e.g. "poisoned".
        condition: String,
    },
    /// Clear the status condition.
    ClearCharacterCondition {
        /// Character name.
        name: String,
    },
    /// Teach a skill.
    LearnCharacterSkill {
        /// Character name.
        name: String,
        /// Skill to learn.
        skill: String,
    },
    /// Summarize every character in play.
    GetAllCharacters,
    /// Start an event from a template.
    ExecuteEventTemplate {
        /// Template id.
        template_id: String,
        /// The action that triggered the event.
        player_action: String,
    },
    /// Record how the current event resolved.
    RecordEventOutcome {
        /// Outcome text.
        outcome: String,
    },
}

/// Names of every tool, in definition order.
pub const TOOL_NAMES: [&str; 11] = [
    "get_character_info",
    "modify_character_hp",
    "modify_character_cash",
    "add_item_to_inventory",
    "remove_item_from_inventory",
    "set_character_condition",
    "clear_character_condition",
    "learn_character_skill",
    "get_all_characters",
    "execute_event_template",
    "record_event_outcome",
];

impl ToolCall {
    /// Parse a tool request from its name and JSON argument string.
    ///
    /// An empty argument string counts as `{}`.
    pub fn parse(name: &str, arguments: &str) -> AgentResult<Self> {
        let args: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments).map_err(|e| {
                AgentError::InvalidToolCall(format!("arguments for '{name}' are not JSON: {e}"))
            })?
        };
        if !args.is_object() {
            return Err(AgentError::InvalidToolCall(format!(
                "arguments for '{name}' must be a JSON object"
            )));
        }
        Self::from_value(name, &args)
    }

    /// Parse a tool request from its name and already-decoded arguments.
    pub fn from_value(name: &str, args: &Value) -> AgentResult<Self> {
        let call = match name {
            "get_character_info" => Self::GetCharacterInfo {
                name: str_arg(name, args, "name")?,
            },
            "modify_character_hp" => Self::ModifyCharacterHp {
                name: str_arg(name, args, "name")?,
                change: int_arg(name, args, "change")?,
            },
            "modify_character_cash" => Self::ModifyCharacterCash {
                name: str_arg(name, args, "name")?,
                change: int_arg(name, args, "change")?,
            },
            "add_item_to_inventory" => Self::AddItemToInventory {
                name: str_arg(name, args, "name")?,
                item: str_arg(name, args, "item")?,
            },
            "remove_item_from_inventory" => Self::RemoveItemFromInventory {
                name: str_arg(name, args, "name")?,
                item: str_arg(name, args, "item")?,
            },
            "set_character_condition" => Self::SetCharacterCondition {
                name: str_arg(name, args, "name")?,
                condition: str_arg(name, args, "condition")?,
            },
            "clear_character_condition" => Self::ClearCharacterCondition {
                name: str_arg(name, args, "name")?,
            },
            "learn_character_skill" => Self::LearnCharacterSkill {
                name: str_arg(name, args, "name")?,
                skill: str_arg(name, args, "skill")?,
            },
            "get_all_characters" => Self::GetAllCharacters,
            "execute_event_template" => Self::ExecuteEventTemplate {
                template_id: str_arg(name, args, "template_id")?,
                player_action: args
                    .get("player_action")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "record_event_outcome" => Self::RecordEventOutcome {
                outcome: str_arg(name, args, "outcome")?,
            },
            other => {
                return Err(AgentError::InvalidToolCall(format!("unknown tool '{other}'")));
            }
        };
        Ok(call)
    }

    /// The wire name of this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetCharacterInfo { .. } => "get_character_info",
            Self::ModifyCharacterHp { .. } => "modify_character_hp",
            Self::ModifyCharacterCash { .. } => "modify_character_cash",
            Self::AddItemToInventory { .. } => "add_item_to_inventory",
            Self::RemoveItemFromInventory { .. } => "remove_item_from_inventory",
            Self::SetCharacterCondition { .. } => "set_character_condition",
            Self::ClearCharacterCondition { .. } => "clear_character_condition",
            Self::LearnCharacterSkill { .. } => "learn_character_skill",
            Self::GetAllCharacters => "get_all_characters",
            Self::ExecuteEventTemplate { .. } => "execute_event_template",
            Self::RecordEventOutcome { .. } => "record_event_outcome",
        }
    }

    /// Run the tool against the session and describe what happened.
    ///
    /// Tools that change a character also note the change on the current
    /// event, if there is one.
    pub fn apply(&self, session: &mut GameSession) -> String {
        debug!(tool = self.name(), "applying tool");
        match self {
            Self::GetCharacterInfo { name } => match session.character(name) {
                Some(character) => character.to_string(),
                None => not_found(name),
            },

            Self::ModifyCharacterHp { name, change } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                let amount = u32::try_from(change.unsigned_abs()).unwrap_or(u32::MAX);
                if *change > 0 {
                    let healed = character.heal(amount);
                    let result = format!(
                        "{name} healed {healed} HP. Current HP: {}/{}",
                        character.current_hp(),
                        character.max_hp()
                    );
                    session.note_change(name, &format!("healed {healed} HP"));
                    result
                } else {
                    let died = character.take_damage(amount);
                    let death = if died { " and DIED!" } else { "" };
                    let result = format!(
                        "{name} took {amount} damage{death}. Current HP: {}/{}",
                        character.current_hp(),
                        character.max_hp()
                    );
                    session.note_change(name, &format!("took {amount} damage{death}"));
                    result
                }
            }

            Self::ModifyCharacterCash { name, change } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                let balance = character.adjust_cash(*change);
                let action = if *change > 0 { "gained" } else { "lost" };
                let amount = change.unsigned_abs();
                session.note_change(name, &format!("{action} ¥{amount}"));
                format!("{name} {action} ¥{amount}. Current cash: ¥{balance}")
            }

            Self::AddItemToInventory { name, item } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                character.add_item(item.as_str());
                session.note_change(name, &format!("gained item '{item}'"));
                format!("Added '{item}' to {name}'s inventory")
            }

            Self::RemoveItemFromInventory { name, item } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                if character.remove_item(item) {
                    session.note_change(name, &format!("lost item '{item}'"));
                    format!("Removed '{item}' from {name}'s inventory")
                } else {
                    format!("{name} doesn't have '{item}' in inventory")
                }
            }

            Self::SetCharacterCondition { name, condition } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                character.set_condition(condition.as_str());
                session.note_change(name, &format!("condition set to {condition}"));
                format!("{name} is now {condition}")
            }

            Self::ClearCharacterCondition { name } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                character.clear_condition();
                session.note_change(name, "condition cleared");
                format!("{name}'s condition has been cleared")
            }

            Self::LearnCharacterSkill { name, skill } => {
                let Some(character) = session.character_mut(name) else {
                    return not_found(name);
                };
                character.learn_skill(skill.as_str());
                session.note_change(name, &format!("learned {skill}"));
                format!("{name} learned the skill: {skill}")
            }

            Self::GetAllCharacters => session.roster(),

            Self::ExecuteEventTemplate {
                template_id,
                player_action,
            } => execute_event(session, template_id, player_action),

            Self::RecordEventOutcome { outcome } => match session.record_outcome(outcome) {
                Ok(()) => {
                    let number = session
                        .current_event()
                        .map(|e| e.event_number)
                        .unwrap_or_default();
                    format!("Recorded outcome for event #{number}: {outcome}")
                }
                Err(_) => "No current event to record an outcome for".to_string(),
            },
        }
    }

    /// Tool definitions in the OpenAI `tools` format.
    pub fn definitions() -> Vec<Value> {
        vec![
            function(
                "get_character_info",
                "Get full information about a character.",
                &[("name", "string", "Name of the character")],
            ),
            function(
                "modify_character_hp",
                "Modify a character's HP. Positive values heal, negative values deal damage.",
                &[
                    ("name", "string", "Name of the character"),
                    ("change", "integer", "Amount to change HP (positive for heal, negative for damage)"),
                ],
            ),
            function(
                "modify_character_cash",
                "Modify a character's cash. Cash never drops below zero.",
                &[
                    ("name", "string", "Name of the character"),
                    ("change", "integer", "Amount to change cash (positive to add, negative to subtract)"),
                ],
            ),
            function(
                "add_item_to_inventory",
                "Add an item to a character's inventory.",
                &[
                    ("name", "string", "Name of the character"),
                    ("item", "string", "Item to add"),
                ],
            ),
            function(
                "remove_item_from_inventory",
                "Remove an item from a character's inventory.",
                &[
                    ("name", "string", "Name of the character"),
                    ("item", "string", "Item to remove"),
                ],
            ),
            function(
                "set_character_condition",
                "Set a character's condition (status effect).",
                &[
                    ("name", "string", "Name of the character"),
                    ("condition", "string", "Condition to set (e.g., 'poisoned', 'sleeping', 'prone')"),
                ],
            ),
            function(
                "clear_character_condition",
                "Clear a character's condition.",
                &[("name", "string", "Name of the character")],
            ),
            function(
                "learn_character_skill",
                "Teach a character a new skill.",
                &[
                    ("name", "string", "Name of the character"),
                    ("skill", "string", "Skill to learn"),
                ],
            ),
            function(
                "get_all_characters",
                "Get a summary of all characters in the game.",
                &[],
            ),
            function(
                "execute_event_template",
                "Execute an event template with context from the player's action.",
                &[
                    ("template_id", "string", "ID of the event template to execute"),
                    ("player_action", "string", "The action the player took that triggered this event"),
                ],
            ),
            function(
                "record_event_outcome",
                "Record the outcome of the event currently being resolved.",
                &[("outcome", "string", "What happened, ideally one of the template's possible outcomes")],
            ),
        ]
    }
}

fn execute_event(session: &mut GameSession, template_id: &str, player_action: &str) -> String {
    let event_number = match session.record_event(template_id, player_action) {
        Ok(event) => event.event_number,
        Err(GameError::TemplateNotFound(_)) => {
            return format!("Event template '{template_id}' not found");
        }
        Err(e) => return format!("Could not execute event '{template_id}': {e}"),
    };
    let Some(template) = session.catalog().get(template_id) else {
        return format!("Event template '{template_id}' not found");
    };
    format!(
        "🎲 EVENT #{event_number}: {} 🎲\n\n{}\n\nUse the available character tools to resolve this event based on the player's action: {player_action}\n\nPossible outcomes: {}\n\nContext hints: {}",
        template.name,
        template.description,
        template.possible_outcomes.join(", "),
        template.context_hints.join(", "),
    )
}

fn not_found(name: &str) -> String {
    format!("Character '{name}' not found")
}

fn str_arg(tool: &str, args: &Value, key: &str) -> AgentResult<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AgentError::InvalidToolCall(format!("'{tool}' needs a string '{key}'")))
}

/// Integers arrive as numbers, whole floats, or numeric strings depending on
/// the model.
fn int_arg(tool: &str, args: &Value, key: &str) -> AgentResult<i64> {
    let value = args.get(key);
    value
        .and_then(Value::as_i64)
        .or_else(|| {
            value
                .and_then(Value::as_f64)
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .or_else(|| value.and_then(Value::as_str).and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| AgentError::InvalidToolCall(format!("'{tool}' needs an integer '{key}'")))
}

fn function(name: &str, description: &str, params: &[(&str, &str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = params
        .iter()
        .map(|(param, kind, doc)| {
            (
                param.to_string(),
                json!({ "type": kind, "description": doc }),
            )
        })
        .collect();
    let required: Vec<&str> = params.iter().map(|(param, _, _)| *param).collect();
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tt_core::{Character, SessionConfig};

    fn session(dir: &TempDir) -> GameSession {
        let config = SessionConfig::default()
            .with_seed(3)
            .with_templates_dir(dir.path().join("templates"))
            .with_characters_dir(dir.path().join("characters"));
        let mut session = GameSession::new(config).unwrap();
        let mut alex = Character::new("Alex");
        alex.set_player_control(true);
        alex.set_cash(500);
        alex.add_item("Sword");
        session.add_character(alex);
        session
    }

    fn run(session: &mut GameSession, name: &str, args: Value) -> String {
        ToolCall::from_value(name, &args).unwrap().apply(session)
    }

    #[test]
    fn parse_known_tools() {
        assert_eq!(
            ToolCall::parse("modify_character_hp", r#"{"name":"Alex","change":-3}"#).unwrap(),
            ToolCall::ModifyCharacterHp {
                name: "Alex".into(),
                change: -3
            }
        );
        assert_eq!(
            ToolCall::parse("get_all_characters", "").unwrap(),
            ToolCall::GetAllCharacters
        );
        assert_eq!(
            ToolCall::parse("modify_character_cash", r#"{"name":"Alex","change":"250"}"#).unwrap(),
            ToolCall::ModifyCharacterCash {
                name: "Alex".into(),
                change: 250
            }
        );
    }

    #[test]
    fn parse_rejects_bad_requests() {
        for (name, args) in [
            ("summon_dragon", "{}"),
            ("get_character_info", "{}"),
            ("get_character_info", "not json"),
            ("get_character_info", "[1, 2]"),
            ("modify_character_hp", r#"{"name":"Alex","change":"lots"}"#),
            ("modify_character_hp", r#"{"name":"Alex","change":1.5}"#),
        ] {
            let err = ToolCall::parse(name, args).unwrap_err();
            assert!(matches!(err, AgentError::InvalidToolCall(_)), "{name} {args}");
        }
    }

    #[test]
    fn names_round_trip_through_definitions() {
        let defs = ToolCall::definitions();
        let names: Vec<&str> = defs
            .iter()
            .map(|d| d["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, TOOL_NAMES);
        for def in &defs {
            assert_eq!(def["type"], "function");
            assert_eq!(def["function"]["parameters"]["type"], "object");
        }
    }

    #[test]
    fn unknown_character_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(
            run(&mut s, "get_character_info", json!({"name": "Nobody"})),
            "Character 'Nobody' not found"
        );
        assert_eq!(
            run(&mut s, "modify_character_hp", json!({"name": "Nobody", "change": 5})),
            "Character 'Nobody' not found"
        );
    }

    #[test]
    fn damage_then_heal() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(
            run(&mut s, "modify_character_hp", json!({"name": "Alex", "change": -2})),
            "Alex took 2 damage. Current HP: 4/6"
        );
        assert_eq!(
            run(&mut s, "modify_character_hp", json!({"name": "Alex", "change": 5})),
            "Alex healed 2 HP. Current HP: 6/6"
        );
    }

    #[test]
    fn lethal_damage_reports_death() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let out = run(&mut s, "modify_character_hp", json!({"name": "Alex", "change": -10}));
        assert_eq!(out, "Alex took 10 damage and DIED!. Current HP: 0/6");
        assert!(!s.character("Alex").unwrap().is_living());
    }

    #[test]
    fn cash_never_negative() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(
            run(&mut s, "modify_character_cash", json!({"name": "Alex", "change": -700})),
            "Alex lost ¥700. Current cash: ¥0"
        );
        assert_eq!(s.character("Alex").unwrap().cash(), 0);
    }

    #[test]
    fn inventory_and_skills() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        run(&mut s, "add_item_to_inventory", json!({"name": "Alex", "item": "Rope"}));
        assert_eq!(
            run(&mut s, "remove_item_from_inventory", json!({"name": "Alex", "item": "Sword"})),
            "Removed 'Sword' from Alex's inventory"
        );
        assert_eq!(
            run(&mut s, "remove_item_from_inventory", json!({"name": "Alex", "item": "Sword"})),
            "Alex doesn't have 'Sword' in inventory"
        );
        run(&mut s, "learn_character_skill", json!({"name": "Alex", "skill": "Climbing"}));
        run(&mut s, "learn_character_skill", json!({"name": "Alex", "skill": "Climbing"}));
        let alex = s.character("Alex").unwrap();
        assert_eq!(alex.inventory(), ["Rope"]);
        assert_eq!(alex.skills(), ["Climbing"]);
    }

    #[test]
    fn conditions() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(
            run(&mut s, "set_character_condition", json!({"name": "Alex", "condition": "poisoned"})),
            "Alex is now poisoned"
        );
        assert_eq!(s.character("Alex").unwrap().condition(), "poisoned");
        assert_eq!(
            run(&mut s, "clear_character_condition", json!({"name": "Alex"})),
            "Alex's condition has been cleared"
        );
        assert_eq!(s.character("Alex").unwrap().condition(), "");
    }

    #[test]
    fn execute_event_and_record_outcome() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let brief = run(
            &mut s,
            "execute_event_template",
            json!({"template_id": "treasure_find", "player_action": "search the vault"}),
        );
        assert!(brief.starts_with("🎲 EVENT #1: Treasure Discovery 🎲"));
        assert!(brief.contains("player's action: search the vault"));
        assert!(brief.contains("Possible outcomes: Find cash, Find equipment"));

        run(&mut s, "modify_character_cash", json!({"name": "Alex", "change": 100}));
        assert_eq!(
            run(&mut s, "record_event_outcome", json!({"outcome": "Find cash"})),
            "Recorded outcome for event #1: Find cash"
        );

        let event = &s.event_history()[0];
        assert_eq!(event.outcome, "Find cash");
        assert_eq!(event.character_changes["Alex"], vec!["gained ¥100"]);
    }

    #[test]
    fn execute_unknown_template() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert_eq!(
            run(
                &mut s,
                "execute_event_template",
                json!({"template_id": "dragon", "player_action": "x"})
            ),
            "Event template 'dragon' not found"
        );
        assert!(s.event_history().is_empty());
        assert_eq!(
            run(&mut s, "record_event_outcome", json!({"outcome": "x"})),
            "No current event to record an outcome for"
        );
    }

    #[test]
    fn roster_tool() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let out = run(&mut s, "get_all_characters", json!({}));
        assert!(out.starts_with("CHARACTERS IN GAME:"));
        assert!(out.contains("Alex"));
        assert!(out.contains("Control: Player"));
    }
}
