//! Game master configuration.

use std::time::Duration;

use tracing::warn;

/// Default OpenAI-compatible endpoint (a local LM Studio server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

/// Environment variable overriding the endpoint.
pub const ENV_BASE_URL: &str = "TT_LLM_BASE_URL";
/// Environment variable overriding the API key.
pub const ENV_API_KEY: &str = "TT_LLM_API_KEY";
/// Environment variable overriding the model name.
pub const ENV_MODEL: &str = "TT_LLM_MODEL";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "TT_LLM_TIMEOUT_SECS";

/// Connection and loop settings for the game master.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Base URL of the chat API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum tool-execution rounds per turn.
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "lm-studio".to_string(),
            model: "local-model".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            max_tool_rounds: 8,
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by the `TT_LLM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `TT_LLM_*` keys.
    /// Empty values are ignored, as is an unparsable timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            config = config.with_model(model);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config = config.with_timeout(Duration::from_secs(secs)),
                Err(_) => warn!(value = %secs, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        config
    }

    /// Set the base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the tool round limit.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}
