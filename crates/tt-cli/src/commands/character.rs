use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tt_core::{CharacterOptions, CharacterStore};

/// Overrides collected from `tt character generate` flags.
pub struct GenerateArgs {
    pub name: Option<String>,
    pub player: bool,
    pub archetype: Option<String>,
    pub max_hp: Option<u32>,
    pub cash: Option<i64>,
    pub look: Option<String>,
    pub goals: Option<String>,
}

impl From<GenerateArgs> for CharacterOptions {
    fn from(args: GenerateArgs) -> Self {
        CharacterOptions {
            name: args.name,
            archetype: args.archetype,
            max_hp: args.max_hp,
            cash: args.cash,
            physical_description: args.look,
            goals: args.goals,
            player_control: args.player,
            ..CharacterOptions::default()
        }
    }
}

pub fn generate(dir: &Path, args: GenerateArgs, seed: Option<u64>) -> Result<(), String> {
    let mut store = CharacterStore::new(dir);
    let mut rng = super::rng_from(seed);

    let character = store.generate(args.into(), &mut rng);
    let path = store
        .export(&character, None)
        .map_err(|e| format!("failed to save character: {e}"))?;

    println!("{character}");
    println!("  {} {}", "Saved".green().bold(), path.display());
    Ok(())
}

pub fn list(dir: &Path) -> Result<(), String> {
    let store = CharacterStore::new(dir);
    let files = store.list().map_err(|e| e.to_string())?;

    if files.is_empty() {
        println!("  No saved characters in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Name", "Archetype", "HP", "Cash", "Control"]);

    for file in &files {
        match store.load(file) {
            Ok(c) => {
                table.add_row(vec![
                    file.clone(),
                    format!("{} {}", c.symbol(), c.name()),
                    c.archetype().to_string(),
                    format!("{}/{}", c.current_hp(), c.max_hp()),
                    format!("¥{}", c.cash()),
                    if c.player_control() { "Player" } else { "NPC" }.to_string(),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    file.clone(),
                    format!("unreadable: {e}"),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]);
            }
        }
    }

    println!("{table}");
    println!();
    println!("  {} characters", files.len());
    Ok(())
}

pub fn show(dir: &Path, file: &str) -> Result<(), String> {
    let store = CharacterStore::new(dir);
    let character = store.load(file).map_err(|e| e.to_string())?;
    println!("{character}");
    Ok(())
}

pub fn delete(dir: &Path, file: &str) -> Result<(), String> {
    let store = CharacterStore::new(dir);
    if store.delete(file).map_err(|e| e.to_string())? {
        println!("  {} {file}", "Deleted".green().bold());
        Ok(())
    } else {
        Err(format!("no saved character named '{file}' in {}", dir.display()))
    }
}
