//! Language-model game master for Tabletale.
//!
//! The model never touches game state directly. It requests [`ToolCall`]s,
//! which are parsed, applied to a [`tt_core::GameSession`], and answered
//! with a short result string. [`GameMaster`] runs that loop over any
//! [`ChatClient`]; [`OpenAiClient`] is the HTTP implementation.

pub mod client;
pub mod config;
pub mod error;
pub mod game_master;
pub mod tools;

pub use client::{ChatClient, ChatMessage, ChatReply, OpenAiClient, Role, ToolInvocation};
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use game_master::{GameMaster, TriggeredEvent};
pub use tools::ToolCall;
