use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use tt_agent::{AgentConfig, ChatClient, GameMaster, OpenAiClient};
use tt_core::{CharacterOptions, GameSession, SessionConfig};

const HELP: &str = "\
Commands:
  help                 Show this help
  characters           List characters in play
  sheet <name>         Show a character sheet
  stats                Show event statistics
  undo                 Undo the last event (character changes stay)
  random [tags...]     Trigger a random event, optionally filtered by tags
  force <id>           Trigger a specific event template
  add <name>           Generate an NPC and add it to the game
  import <file>        Add a saved character from the characters directory
  export <name>        Save a character to the characters directory
  save <path>          Save the session
  load <path>          Restore a saved session
  clear                Clear the story log
  clear event          Forget the current event
  quit                 Leave the session

Anything else is sent to the game master as your action.";

/// What the loop should do after a line of input.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue(String),
    Quit(String),
}

pub fn run(
    templates: &Path,
    characters: &Path,
    load: Option<&Path>,
    demo: bool,
    seed: Option<u64>,
) -> Result<(), String> {
    let mut config = SessionConfig::default()
        .with_templates_dir(templates)
        .with_characters_dir(characters);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut session =
        GameSession::new(config).map_err(|e| format!("failed to start session: {e}"))?;
    if let Some(path) = load {
        session
            .load_from(path)
            .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
    }
    if demo {
        add_demo_party(&mut session);
    }

    let agent_config = AgentConfig::from_env();
    let client = OpenAiClient::new(agent_config.clone()).map_err(|e| e.to_string())?;
    let mut repl = Repl {
        session,
        game_master: GameMaster::new(client, &agent_config),
    };

    println!("  {} Tabletale session", "Starting".bold());
    println!(
        "  {} characters | {} templates | model {} at {}",
        repl.session.character_count(),
        repl.session.catalog().len(),
        agent_config.model,
        agent_config.base_url
    );
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match repl.process(input) {
            Ok(Step::Continue(output)) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
            }
            Ok(Step::Quit(output)) => {
                println!("{output}");
                break;
            }
            Err(e) => println!("{}\n", e.yellow()),
        }
    }

    Ok(())
}

/// The demo party: a player character and a mentor NPC.
fn add_demo_party(session: &mut GameSession) {
    let options = CharacterOptions::default()
        .with_cash(500)
        .with_physical_description("A young adventurer with determination in their eyes")
        .with_goals("Discover the truth about the ancient ruins");
    session.spawn_player("Alex", options);
    if let Some(alex) = session.character_mut("Alex") {
        alex.add_item("Sword");
        alex.add_item("Health Potion");
        alex.learn_skill("Swordsmanship");
    }

    session.spawn_npc(CharacterOptions::default().with_name("Sage Mentor").with_cash(100));
    if let Some(sage) = session.character_mut("Sage Mentor") {
        sage.add_item("Ancient Tome");
        sage.learn_skill("Ancient Knowledge");
    }
}

struct Repl<C> {
    session: GameSession,
    game_master: GameMaster<C>,
}

impl<C: ChatClient> Repl<C> {
    fn process(&mut self, input: &str) -> Result<Step, String> {
        let trimmed = input.trim();
        let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (trimmed, ""),
        };

        let output = match cmd.to_lowercase().as_str() {
            "help" | "?" => HELP.to_string(),
            "characters" => self.session.roster(),
            "sheet" => self.sheet(rest)?,
            "stats" => self.session.event_statistics(),
            "undo" => self.undo(),
            "random" => self.random(rest)?,
            "force" => self.force(rest)?,
            "add" => self.add(rest)?,
            "import" => self.import(rest)?,
            "export" => self.export(rest)?,
            "save" => self.save(rest)?,
            "load" => self.load(rest)?,
            "clear" if rest.eq_ignore_ascii_case("event") => {
                self.session.clear_current_event();
                "Current event cleared.".to_string()
            }
            "clear" if rest.is_empty() => {
                self.session.clear_story();
                "Story log cleared.".to_string()
            }
            "quit" | "q" | "exit" => return Ok(Step::Quit("Goodbye!".to_string())),
            _ => self
                .game_master
                .process_player_action(&mut self.session, trimmed)
                .map_err(|e| format!("Error processing action: {e}"))?,
        };
        Ok(Step::Continue(output))
    }

    fn sheet(&self, name: &str) -> Result<String, String> {
        let name = required(name, "sheet <name>")?;
        self.session
            .character(name)
            .map(|c| c.to_string())
            .ok_or_else(|| format!("Character '{name}' not found"))
    }

    fn undo(&mut self) -> String {
        match self.session.undo_last() {
            Ok(event) => format!(
                "Undid event #{}: {}",
                event.event_number, event.template_name
            ),
            Err(_) => "No events to undo".to_string(),
        }
    }

    fn random(&mut self, rest: &str) -> Result<String, String> {
        let tags: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        let event = self
            .game_master
            .trigger_random_event(&mut self.session, &tags)
            .map_err(|e| format!("Error triggering random event: {e}"))?;
        match event {
            Some(event) => Ok(format!(
                "🎲 RANDOM EVENT: {} 🎲\n\n{}",
                event.template_name, event.narrative
            )),
            None => Err("No event templates available".to_string()),
        }
    }

    fn force(&mut self, id: &str) -> Result<String, String> {
        let id = required(id, "force <template id>")?;
        let event = self
            .game_master
            .force_event(&mut self.session, id)
            .map_err(|e| format!("Error forcing event: {e}"))?;
        Ok(format!(
            "⚡ FORCED EVENT: {} ⚡\n\n{}",
            event.template_name, event.narrative
        ))
    }

    fn add(&mut self, name: &str) -> Result<String, String> {
        let name = required(name, "add <name>")?;
        let npc = self
            .session
            .spawn_npc(CharacterOptions::default().with_name(name));
        Ok(format!("Added new character: {}", npc.name()))
    }

    fn import(&mut self, file: &str) -> Result<String, String> {
        let file = required(file, "import <file>")?;
        let character = self.session.store().load(file).map_err(|e| e.to_string())?;
        let name = character.name().to_string();
        self.session.add_character(character);
        Ok(format!("Imported {name} from {file}"))
    }

    fn export(&self, name: &str) -> Result<String, String> {
        let name = required(name, "export <name>")?;
        let character = self
            .session
            .character(name)
            .ok_or_else(|| format!("Character '{name}' not found"))?;
        let path = self
            .session
            .store()
            .export(character, None)
            .map_err(|e| e.to_string())?;
        Ok(format!("Exported {name} to {}", path.display()))
    }

    fn save(&self, path: &str) -> Result<String, String> {
        let path = required(path, "save <path>")?;
        self.session
            .save_to(Path::new(path))
            .map_err(|e| format!("Failed to save game: {e}"))?;
        Ok(format!("Game saved to {path}"))
    }

    fn load(&mut self, path: &str) -> Result<String, String> {
        let path = required(path, "load <path>")?;
        self.session
            .load_from(Path::new(path))
            .map_err(|e| format!("Failed to load game: {e}"))?;
        let mut out = format!(
            "Game loaded from {path}: {} characters, {} events",
            self.session.character_count(),
            self.session.event_history().len()
        );
        for entry in self.session.story_log() {
            out.push('\n');
            out.push_str(entry);
        }
        Ok(out)
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::VecDeque;
    use tempfile::TempDir;
    use tt_agent::{AgentResult, ChatMessage, ChatReply, ToolInvocation};

    struct Scripted(VecDeque<ChatReply>);

    impl ChatClient for Scripted {
        fn complete(&mut self, _: &[ChatMessage], _: &[Value]) -> AgentResult<ChatReply> {
            Ok(self.0.pop_front().unwrap_or_default())
        }
    }

    fn repl(dir: &TempDir, replies: Vec<ChatReply>) -> Repl<Scripted> {
        let config = SessionConfig::default()
            .with_seed(5)
            .with_templates_dir(dir.path().join("templates"))
            .with_characters_dir(dir.path().join("characters"));
        let mut session = GameSession::new(config).unwrap();
        add_demo_party(&mut session);
        Repl {
            session,
            game_master: GameMaster::new(Scripted(replies.into()), &AgentConfig::default()),
        }
    }

    fn say(text: &str) -> ChatReply {
        ChatReply {
            content: text.to_string(),
            tool_calls: Vec::new(),
        }
    }

    fn cont(step: Result<Step, String>) -> String {
        match step {
            Ok(Step::Continue(out)) => out,
            other => panic!("expected output, got {other:?}"),
        }
    }

    #[test]
    fn demo_party() {
        let dir = TempDir::new().unwrap();
        let r = repl(&dir, Vec::new());
        let alex = r.session.character("Alex").unwrap();
        assert!(alex.player_control());
        assert_eq!(alex.cash(), 500);
        assert_eq!(alex.inventory(), ["Sword", "Health Potion"]);
        assert_eq!(alex.skills(), ["Swordsmanship"]);
        let sage = r.session.character("Sage Mentor").unwrap();
        assert!(!sage.player_control());
        assert_eq!(sage.cash(), 100);
        assert_eq!(sage.inventory(), ["Ancient Tome"]);
    }

    #[test]
    fn builtin_commands() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(&dir, Vec::new());
        assert!(cont(r.process("help")).contains("clear event"));
        assert!(cont(r.process("characters")).contains("Sage Mentor"));
        assert!(cont(r.process("sheet Alex")).contains("NAME: Alex"));
        assert!(cont(r.process("sheet Sage Mentor")).contains("Ancient Tome"));
        assert_eq!(
            cont(r.process("stats")),
            "No events have been triggered yet."
        );
        assert_eq!(cont(r.process("undo")), "No events to undo");
        assert_eq!(r.process("QUIT"), Ok(Step::Quit("Goodbye!".to_string())));
    }

    #[test]
    fn errors_are_reported() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(&dir, Vec::new());
        assert_eq!(
            r.process("sheet Nobody"),
            Err("Character 'Nobody' not found".to_string())
        );
        assert_eq!(r.process("force"), Err("usage: force <template id>".to_string()));
        assert!(r.process("force dragon").unwrap_err().contains("not found"));
        assert!(r.process("import ghost.json").is_err());
    }

    #[test]
    fn free_text_goes_to_game_master() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(
            &dir,
            vec![
                ChatReply {
                    content: String::new(),
                    tool_calls: vec![ToolInvocation {
                        id: "1".into(),
                        name: "execute_event_template".into(),
                        arguments: r#"{"template_id":"treasure_find","player_action":"search"}"#
                            .into(),
                    }],
                },
                say("You find a glinting coin."),
            ],
        );
        assert_eq!(cont(r.process("search the ruins")), "You find a glinting coin.");
        assert_eq!(r.session.event_history().len(), 1);
        assert_eq!(r.session.story_log().len(), 2);

        assert!(cont(r.process("stats")).contains("Treasure Discovery (treasure_find): 1 times"));
        assert_eq!(cont(r.process("undo")), "Undid event #1: Treasure Discovery");
        assert!(r.session.story_log().is_empty());
    }

    #[test]
    fn random_and_forced_events() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(&dir, vec![say("Blades clash."), say("A deal is struck.")]);
        let out = cont(r.process("random combat"));
        assert!(out.starts_with("🎲 RANDOM EVENT: Combat Encounter 🎲"));
        assert!(out.ends_with("Blades clash."));
        let out = cont(r.process("force social_encounter"));
        assert!(out.starts_with("⚡ FORCED EVENT: Social Encounter ⚡"));
        assert!(r.process("random nothing_tagged_this").is_err());
    }

    #[test]
    fn add_export_import() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(&dir, Vec::new());
        assert_eq!(cont(r.process("add Rook")), "Added new character: Rook");
        assert!(cont(r.process("export Rook")).contains("rook.json"));
        r.session.remove_character("Rook");
        assert_eq!(cont(r.process("import rook.json")), "Imported Rook from rook.json");
        assert!(r.session.character("Rook").is_some());
    }

    #[test]
    fn save_clear_load() {
        let dir = TempDir::new().unwrap();
        let mut r = repl(&dir, vec![say("Quiet night.")]);
        cont(r.process("rest a while"));
        let save = dir.path().join("game.json");
        let save = save.to_str().unwrap();
        assert!(cont(r.process(&format!("save {save}"))).contains("Game saved"));

        assert_eq!(cont(r.process("clear")), "Story log cleared.");
        assert!(r.session.story_log().is_empty());
        assert_eq!(cont(r.process("clear event")), "Current event cleared.");

        let out = cont(r.process(&format!("load {save}")));
        assert!(out.contains("2 characters"));
        assert!(out.contains("GM: Quiet night."));
        assert_eq!(r.session.story_log().len(), 2);
    }
}
