//! Reasoning-service configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the Gemini analysis client.
///
/// Passed into [`GeminiClient::new`](crate::GeminiClient) explicitly; nothing
/// here is read from a global at call time.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL up to and including the API version segment.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Upper bound on one generate call, connect included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// In-flight request cap for the admission gate. `None` disables the gate.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<usize>,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_max_concurrency() -> Option<usize> {
    Some(4)
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl GeminiConfig {
    /// Defaults with process environment applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides.
    ///
    /// - `GEMINI_API_KEY` (falls back to `API_KEY`)
    /// - `GEMINI_MODEL`
    /// - `GEMINI_ENDPOINT`
    /// - `GEMINI_TIMEOUT_SECS`
    /// - `GEMINI_MAX_CONCURRENCY` (`0` disables the admission gate)
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("API_KEY")) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.model = model.trim().to_string();
        }
        if let Some(endpoint) = get("GEMINI_ENDPOINT") {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(secs) = get("GEMINI_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(n) = get("GEMINI_MAX_CONCURRENCY").and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.max_concurrency = (n > 0).then_some(n);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether a non-empty API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
