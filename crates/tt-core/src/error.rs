//! Error types for characters, templates, and sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Alias for `Result<T, GameError>`.
pub type GameResult<T> = Result<T, GameError>;

/// Errors that can occur while manipulating game data.
#[derive(Debug, Error)]
pub enum GameError {
    /// No character file exists at the given path.
    #[error("character file not found: {}", .0.display())]
    CharacterNotFound(PathBuf),

    /// No template with the given id is in the catalog.
    #[error("event template '{0}' not found")]
    TemplateNotFound(String),

    /// Undo was requested with no events in the history.
    #[error("no events to undo")]
    EmptyHistory,

    /// An operation needed a current event but none is set.
    #[error("no current event")]
    NoCurrentEvent,

    /// A template failed authoring validation.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
