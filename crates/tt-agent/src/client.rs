//! Chat-completion client for the game master model.
//!
//! [`ChatClient`] is the seam between the turn loop and the network.
//! [`OpenAiClient`] speaks the OpenAI-compatible `/chat/completions` protocol
//! that LM Studio, Ollama, and hosted providers all accept.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// Player or game input.
    User,
    /// Model output.
    Assistant,
    /// The result of a tool call.
    Tool,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Call id, echoed back with the result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author.
    pub role: Role,
    /// Text content. Assistant messages that only call tools may be empty.
    pub content: String,
    /// Tool calls made by an assistant message.
    pub tool_calls: Vec<ToolInvocation>,
    /// For tool messages, the id of the call being answered.
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// An assistant message, possibly carrying tool calls.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// The result of the tool call `id`.
    pub fn tool_result(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(id.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// A model reply: text plus any tool calls it wants made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant text.
    pub content: String,
    /// Requested tool calls, in order.
    pub tool_calls: Vec<ToolInvocation>,
}

/// Something that can complete a conversation.
pub trait ChatClient {
    /// Send the conversation and the available tool definitions, returning
    /// the model's next message.
    fn complete(&mut self, messages: &[ChatMessage], tools: &[Value]) -> AgentResult<ChatReply>;
}

/// Blocking client for OpenAI-compatible chat endpoints.
pub struct OpenAiClient {
    http: Client,
    config: AgentConfig,
}

impl OpenAiClient {
    /// Build a client with the configured timeout.
    pub fn new(config: AgentConfig) -> AgentResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::ExternalCall(format!("could not build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

impl ChatClient for OpenAiClient {
    fn complete(&mut self, messages: &[ChatMessage], tools: &[Value]) -> AgentResult<ChatReply> {
        let url = self.config.completions_url();
        let request = CompletionRequest {
            model: &self.config.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
            tools: (!tools.is_empty()).then_some(tools),
        };
        debug!(%url, messages = messages.len(), "sending chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                warn!(%url, error = %e, "chat request failed");
                AgentError::ExternalCall(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%url, %status, "chat endpoint returned an error");
            return Err(AgentError::ExternalCall(format!(
                "{url} returned {status}: {}",
                body.trim()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .map_err(|e| AgentError::ExternalCall(format!("could not decode reply from {url}: {e}")))?;
        body.into_reply()
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl CompletionResponse {
    fn into_reply(self) -> AgentResult<ChatReply> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ExternalCall("reply contained no choices".into()))?;
        Ok(choice.message.into())
    }
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// Usually a JSON string; some servers send the object itself.
    #[serde(default)]
    arguments: Value,
}

fn function_kind() -> String {
    "function".to_string()
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: Some(message.content.clone()),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_kind(),
                    function: WireFunction {
                        name: call.name.clone(),
                        arguments: Value::String(call.arguments.clone()),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<WireMessage> for ChatReply {
    fn from(message: WireMessage) -> Self {
        let tool_calls = message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, call)| ToolInvocation {
                id: if call.id.is_empty() {
                    format!("call_{i}")
                } else {
                    call.id
                },
                name: call.function.name,
                arguments: match call.function.arguments {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                },
            })
            .collect();
        Self {
            content: message.content.unwrap_or_default(),
            tool_calls,
        }
    }
}
