//! Core types for LLM requests and responses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection and sampling settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL, without the `/v1/...` path.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl LlmSettings {
    /// Settings for `model` on the public OpenAI endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }

    /// Point the settings at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the completion token ceiling.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The chat-completions URL for these settings.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// A request to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// System prompt (role and output rules).
    pub system: String,
    /// User prompt (the rendered template).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
}

/// A response from the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated, when the service reports it.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model answered.
    pub model: String,
}
