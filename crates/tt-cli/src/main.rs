//! CLI frontend for Tabletale, a tabletop RPG toy with a language-model game master.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tt_core::config::{DEFAULT_CHARACTERS_DIR, DEFAULT_TEMPLATES_DIR};

#[derive(Parser)]
#[command(
    name = "tt",
    about = "Tabletale: characters, event templates, and a language-model game master",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and manage saved characters
    Character {
        #[command(subcommand)]
        action: CharacterAction,
    },

    /// Author and inspect event templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Draw noir story elements from the trope table
    Tropes {
        /// Number of story elements to draw
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Chance (0.0 to 1.0) that each element is subverted
        #[arg(short = 's', long = "subversion", default_value = "0.3")]
        rate: f64,

        /// RNG seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Start an interactive game session
    Play {
        /// Directory holding event templates
        #[arg(long, default_value = DEFAULT_TEMPLATES_DIR)]
        templates: PathBuf,

        /// Directory holding saved characters
        #[arg(long, default_value = DEFAULT_CHARACTERS_DIR)]
        characters: PathBuf,

        /// Restore a saved session before starting
        #[arg(long)]
        load: Option<PathBuf>,

        /// Start with a demo party (Alex and Sage Mentor)
        #[arg(long)]
        demo: bool,

        /// RNG seed for reproducible random events
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum CharacterAction {
    /// Generate a character with a background and save it
    Generate {
        /// Character name (default: Unknown_NNNN)
        #[arg(long)]
        name: Option<String>,

        /// Make the character player-controlled
        #[arg(long)]
        player: bool,

        /// Archetype (default: suggested by the background)
        #[arg(long)]
        archetype: Option<String>,

        /// Maximum hit points
        #[arg(long)]
        max_hp: Option<u32>,

        /// Starting cash
        #[arg(long)]
        cash: Option<i64>,

        /// Physical description
        #[arg(long)]
        look: Option<String>,

        /// Goals
        #[arg(long)]
        goals: Option<String>,

        /// RNG seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,

        /// Directory holding saved characters
        #[arg(short, long, default_value = DEFAULT_CHARACTERS_DIR)]
        dir: PathBuf,
    },

    /// List saved characters
    List {
        /// Directory holding saved characters
        #[arg(short, long, default_value = DEFAULT_CHARACTERS_DIR)]
        dir: PathBuf,
    },

    /// Show a saved character's sheet
    Show {
        /// Character file name, e.g. alex.json
        file: String,

        /// Directory holding saved characters
        #[arg(short, long, default_value = DEFAULT_CHARACTERS_DIR)]
        dir: PathBuf,
    },

    /// Delete a saved character
    Delete {
        /// Character file name, e.g. alex.json
        file: String,

        /// Directory holding saved characters
        #[arg(short, long, default_value = DEFAULT_CHARACTERS_DIR)]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List templates in the catalog
    List {
        /// Directory holding event templates
        #[arg(short, long, default_value = DEFAULT_TEMPLATES_DIR)]
        dir: PathBuf,
    },

    /// Show one template in full
    Show {
        /// Template id
        id: String,

        /// Directory holding event templates
        #[arg(short, long, default_value = DEFAULT_TEMPLATES_DIR)]
        dir: PathBuf,
    },

    /// Pick a random template
    Random {
        /// Only consider templates with one of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// RNG seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,

        /// Directory holding event templates
        #[arg(short, long, default_value = DEFAULT_TEMPLATES_DIR)]
        dir: PathBuf,
    },

    /// Create or replace a template
    New {
        /// Unique id, also the file name
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// What happens
        #[arg(long)]
        description: String,

        /// easy, medium, or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Keyword that suggests the event (repeatable)
        #[arg(long = "trigger")]
        triggers: Vec<String>,

        /// Possible outcome (repeatable)
        #[arg(long = "outcome")]
        outcomes: Vec<String>,

        /// Tool the resolution is expected to use (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,

        /// Hint for the game master (repeatable)
        #[arg(long = "hint")]
        hints: Vec<String>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Directory holding event templates
        #[arg(short, long, default_value = DEFAULT_TEMPLATES_DIR)]
        dir: PathBuf,
    },
}

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Character { action } => match action {
            CharacterAction::Generate {
                name,
                player,
                archetype,
                max_hp,
                cash,
                look,
                goals,
                seed,
                dir,
            } => commands::character::generate(
                &dir,
                commands::character::GenerateArgs {
                    name,
                    player,
                    archetype,
                    max_hp,
                    cash,
                    look,
                    goals,
                },
                seed,
            ),
            CharacterAction::List { dir } => commands::character::list(&dir),
            CharacterAction::Show { file, dir } => commands::character::show(&dir, &file),
            CharacterAction::Delete { file, dir } => commands::character::delete(&dir, &file),
        },
        Commands::Template { action } => match action {
            TemplateAction::List { dir } => commands::template::list(&dir),
            TemplateAction::Show { id, dir } => commands::template::show(&dir, &id),
            TemplateAction::Random { tags, seed, dir } => {
                commands::template::random(&dir, &tags, seed)
            }
            TemplateAction::New {
                id,
                name,
                description,
                difficulty,
                triggers,
                outcomes,
                tools,
                hints,
                tags,
                dir,
            } => commands::template::new(
                &dir,
                commands::template::NewTemplate {
                    id,
                    name,
                    description,
                    difficulty,
                    triggers,
                    outcomes,
                    tools,
                    hints,
                    tags,
                },
            ),
        },
        Commands::Tropes { count, rate, seed } => commands::tropes::run(count, rate, seed),
        Commands::Play {
            templates,
            characters,
            load,
            demo,
            seed,
        } => commands::play::run(&templates, &characters, load.as_deref(), demo, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
