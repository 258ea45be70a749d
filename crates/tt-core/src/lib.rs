//! Core types for Tabletale: characters, event templates, and game sessions.
//!
//! This crate owns the data model and its JSON persistence. It knows nothing
//! about language models or terminals; the game master in `tt-agent` and the
//! CLI drive it through the plain operations exposed here.

/// Background text generation for new characters.
pub mod background;
/// Directory-backed catalog of event templates.
pub mod catalog;
/// The character record and its clamped vitals.
pub mod character;
/// Session configuration.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// Executed event records and per-template statistics.
pub mod event;
/// The mutable state of one play-through.
pub mod session;
/// One-file-per-character persistence.
pub mod store;
/// Static event template definitions.
pub mod template;

pub use background::{Background, BackgroundGenerator, TableBackgroundGenerator};
pub use catalog::TemplateCatalog;
pub use character::Character;
pub use config::SessionConfig;
pub use error::{GameError, GameResult};
pub use event::{EventStats, GameEvent};
pub use session::GameSession;
pub use store::{CharacterOptions, CharacterStore};
pub use template::{Difficulty, EventTemplate};
