//! The game master turn loop.
//!
//! Each turn sends the rules, the party, and the template ids to the model,
//! then keeps applying the tools it asks for until it answers in plain text.

use tracing::{debug, info, warn};
use tt_core::{GameError, GameSession};

use crate::client::{ChatClient, ChatMessage};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::tools::ToolCall;

const RULES: &str = include_str!("prompts/game_master.txt");

/// An event started by the game itself rather than by player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredEvent {
    /// Template id.
    pub template_id: String,
    /// Template name.
    pub template_name: String,
    /// The model's narrative of the resolution.
    pub narrative: String,
}

/// Drives a [`ChatClient`] against a [`GameSession`].
pub struct GameMaster<C> {
    client: C,
    max_tool_rounds: usize,
}

impl<C: ChatClient> GameMaster<C> {
    /// A game master using `client` with the loop limit from `config`.
    pub fn new(client: C, config: &AgentConfig) -> Self {
        Self {
            client,
            max_tool_rounds: config.max_tool_rounds,
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve one player action and log the exchange.
    ///
    /// Tool effects applied before a failure stay applied; the story log is
    /// only written on success.
    pub fn process_player_action(
        &mut self,
        session: &mut GameSession,
        player_input: &str,
    ) -> AgentResult<String> {
        let prompt = turn_prompt(session, player_input);
        let narrative = self.run(session, prompt)?;
        session.append_exchange(player_input, &narrative);
        Ok(narrative)
    }

    /// Pick a random template (filtered by `tags` when non-empty) and have
    /// the model execute and resolve it. `None` when no template qualifies.
    pub fn trigger_random_event(
        &mut self,
        session: &mut GameSession,
        tags: &[String],
    ) -> AgentResult<Option<TriggeredEvent>> {
        let Some(template) = session.random_template(tags) else {
            info!(?tags, "no template matches random event request");
            return Ok(None);
        };
        let prompt = format!(
            "A random event has been triggered: {}. Execute this event using execute_event_template with template_id '{}' and player_action 'random event triggered'. Then use the appropriate character tools to resolve the event based on the template description and possible outcomes.",
            template.name, template.id
        );
        let narrative = self.run(session, prompt)?;
        session.append_exchange(&format!("[RANDOM EVENT: {}]", template.name), &narrative);
        Ok(Some(TriggeredEvent {
            template_id: template.id,
            template_name: template.name,
            narrative,
        }))
    }

    /// Have the model execute and resolve the template `template_id`.
    pub fn force_event(
        &mut self,
        session: &mut GameSession,
        template_id: &str,
    ) -> AgentResult<TriggeredEvent> {
        let template = session
            .catalog()
            .get(template_id)
            .cloned()
            .ok_or_else(|| GameError::TemplateNotFound(template_id.to_string()))?;
        let prompt = format!(
            "A specific event has been forced: {}. Execute this event using execute_event_template with template_id '{}' and player_action 'forced event'. Then use the appropriate character tools to resolve the event based on the template description and possible outcomes.",
            template.name, template.id
        );
        let narrative = self.run(session, prompt)?;
        session.append_exchange(&format!("[FORCED EVENT: {}]", template.name), &narrative);
        Ok(TriggeredEvent {
            template_id: template.id,
            template_name: template.name,
            narrative,
        })
    }

    fn run(&mut self, session: &mut GameSession, prompt: String) -> AgentResult<String> {
        let tools = ToolCall::definitions();
        let mut messages = vec![ChatMessage::system(RULES), ChatMessage::user(prompt)];
        let mut rounds = 0;

        loop {
            let reply = self.client.complete(&messages, &tools).inspect_err(|e| {
                warn!(error = %e, "game master call failed");
            })?;

            if reply.tool_calls.is_empty() {
                return Ok(reply.content.trim().to_string());
            }
            if rounds == self.max_tool_rounds {
                warn!(rounds, "game master exceeded tool round limit");
                return Err(AgentError::ToolRoundsExceeded(rounds));
            }
            rounds += 1;

            let calls = reply.tool_calls.clone();
            messages.push(ChatMessage::assistant(reply.content, reply.tool_calls));
            for call in calls {
                let result = match ToolCall::parse(&call.name, &call.arguments) {
                    Ok(tool) => tool.apply(session),
                    Err(e) => {
                        debug!(tool = %call.name, error = %e, "rejected tool call");
                        e.to_string()
                    }
                };
                messages.push(ChatMessage::tool_result(call.id, result));
            }
        }
    }
}

fn turn_prompt(session: &GameSession, player_input: &str) -> String {
    format!(
        "The player has input: \"{player_input}\"\n\nCurrent game state:\n{}\n\nAvailable event templates: {}",
        session.roster(),
        session.catalog().ids().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatReply, ToolInvocation};
    use serde_json::Value;
    use std::collections::VecDeque;
    use tempfile::TempDir;
    use tt_core::{Character, SessionConfig};

    #[derive(Default)]
    struct ScriptedClient {
        replies: VecDeque<AgentResult<ChatReply>>,
        requests: Vec<Vec<ChatMessage>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<AgentResult<ChatReply>>) -> Self {
            Self {
                replies: replies.into(),
                requests: Vec::new(),
            }
        }
    }

    impl ChatClient for ScriptedClient {
        fn complete(&mut self, messages: &[ChatMessage], _tools: &[Value]) -> AgentResult<ChatReply> {
            self.requests.push(messages.to_vec());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok(text("(silence)")))
        }
    }

    fn text(content: &str) -> ChatReply {
        ChatReply {
            content: content.to_string(),
            tool_calls: Vec::new(),
        }
    }

    fn calls(calls: &[(&str, &str)]) -> ChatReply {
        ChatReply {
            content: String::new(),
            tool_calls: calls
                .iter()
                .enumerate()
                .map(|(i, (name, args))| ToolInvocation {
                    id: format!("call_{i}"),
                    name: name.to_string(),
                    arguments: args.to_string(),
                })
                .collect(),
        }
    }

    fn session(dir: &TempDir) -> GameSession {
        let config = SessionConfig::default()
            .with_seed(11)
            .with_templates_dir(dir.path().join("templates"))
            .with_characters_dir(dir.path().join("characters"));
        let mut session = GameSession::new(config).unwrap();
        let mut alex = Character::new("Alex");
        alex.set_player_control(true);
        session.add_character(alex);
        session
    }

    fn master(replies: Vec<AgentResult<ChatReply>>) -> GameMaster<ScriptedClient> {
        GameMaster::new(ScriptedClient::new(replies), &AgentConfig::default())
    }

    #[test]
    fn plain_reply_is_logged() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![Ok(text("  The rain keeps falling.  "))]);

        let narrative = gm.process_player_action(&mut s, "wait").unwrap();
        assert_eq!(narrative, "The rain keeps falling.");
        assert_eq!(s.story_log(), ["Player: wait", "GM: The rain keeps falling."]);

        let prompt = &gm.client().requests[0][1].content;
        assert!(prompt.contains("The player has input: \"wait\""));
        assert!(prompt.contains("CHARACTERS IN GAME:"));
        assert!(prompt.contains("combat_encounter"));
    }

    #[test]
    fn tool_calls_are_applied_and_fed_back() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![
            Ok(calls(&[(
                "execute_event_template",
                r#"{"template_id":"combat_encounter","player_action":"attack"}"#,
            )])),
            Ok(calls(&[
                ("modify_character_hp", r#"{"name":"Alex","change":-2}"#),
                ("record_event_outcome", r#"{"outcome":"Victory with injuries"}"#),
            ])),
            Ok(text("You win, bruised.")),
        ]);

        let narrative = gm.process_player_action(&mut s, "attack").unwrap();
        assert_eq!(narrative, "You win, bruised.");
        assert_eq!(s.character("Alex").unwrap().current_hp(), 4);

        let event = &s.event_history()[0];
        assert_eq!(event.outcome, "Victory with injuries");
        assert_eq!(event.character_changes["Alex"], vec!["took 2 damage"]);

        let last_request = &gm.client().requests[2];
        let results: Vec<&str> = last_request
            .iter()
            .filter(|m| m.tool_call_id.is_some())
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].starts_with("🎲 EVENT #1: Combat Encounter"));
        assert_eq!(results[1], "Alex took 2 damage. Current HP: 4/6");
    }

    #[test]
    fn invalid_tool_call_is_reported_to_model() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![
            Ok(calls(&[("summon_dragon", "{}")])),
            Ok(text("Nothing answers.")),
        ]);
        gm.process_player_action(&mut s, "summon").unwrap();
        let feedback = &gm.client().requests[1].last().unwrap().content;
        assert!(feedback.contains("unknown tool 'summon_dragon'"));
    }

    #[test]
    fn external_failure_leaves_log_untouched() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![Err(AgentError::ExternalCall("connection refused".into()))]);
        let err = gm.process_player_action(&mut s, "hello").unwrap_err();
        assert!(matches!(err, AgentError::ExternalCall(_)));
        assert!(s.story_log().is_empty());
    }

    #[test]
    fn tool_round_limit() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let looping: Vec<_> = (0..5)
            .map(|_| Ok(calls(&[("get_all_characters", "{}")])))
            .collect();
        let mut gm = GameMaster::new(
            ScriptedClient::new(looping),
            &AgentConfig::default().with_max_tool_rounds(2),
        );
        let err = gm.process_player_action(&mut s, "loop").unwrap_err();
        assert!(matches!(err, AgentError::ToolRoundsExceeded(2)));
        assert_eq!(gm.client().requests.len(), 3);
    }

    #[test]
    fn forced_event_prompt_and_log() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![
            Ok(calls(&[(
                "execute_event_template",
                r#"{"template_id":"social_encounter","player_action":"forced event"}"#,
            )])),
            Ok(text("A stranger waves.")),
        ]);
        let event = gm.force_event(&mut s, "social_encounter").unwrap();
        assert_eq!(event.template_name, "Social Encounter");
        assert_eq!(event.narrative, "A stranger waves.");
        assert!(
            gm.client().requests[0][1]
                .content
                .contains("template_id 'social_encounter'")
        );
        assert_eq!(s.event_history().len(), 1);
        assert_eq!(s.story_log()[0], "Player: [FORCED EVENT: Social Encounter]");
    }

    #[test]
    fn forced_unknown_event() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(Vec::new());
        let err = gm.force_event(&mut s, "dragon").unwrap_err();
        assert!(matches!(err, AgentError::Game(GameError::TemplateNotFound(_))));
        assert!(gm.client().requests.is_empty());
    }

    #[test]
    fn random_event_respects_tags() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut gm = master(vec![Ok(text("Steel flashes."))]);
        let event = gm
            .trigger_random_event(&mut s, &["combat".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(event.template_id, "combat_encounter");

        assert!(
            gm.trigger_random_event(&mut s, &["nonexistent".to_string()])
                .unwrap()
                .is_none()
        );
    }
}
