//! Error types for the game master and tool dispatch.

use thiserror::Error;
use tt_core::GameError;

/// Alias for `Result<T, AgentError>`.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur while running the game master.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The chat endpoint could not be reached or returned something unusable.
    #[error("external call failed: {0}")]
    ExternalCall(String),

    /// The model requested an unknown tool or passed bad arguments.
    #[error("invalid tool call: {0}")]
    InvalidToolCall(String),

    /// The model kept requesting tools past the configured round limit.
    #[error("model still requesting tools after {0} rounds")]
    ToolRoundsExceeded(usize),

    /// A session operation failed.
    #[error(transparent)]
    Game(#[from] GameError),
}
