//! LLM error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed before a response arrived.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status.
    #[error("LLM service returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// LLM response was not valid JSON.
    #[error("Failed to parse LLM response as JSON: {0}")]
    ParseError(String),

    /// The service answered but produced no text.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// Request did not finish within the configured timeout.
    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    /// LLM provider is unreachable.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// A prompt template references a value that was not supplied.
    #[error("Prompt template '{template}' has no value for placeholder {{{name}}}")]
    MissingVariable {
        /// Template being rendered.
        template: String,
        /// Placeholder without a value.
        name: String,
    },

    /// Configuration error (credentials, templates, client setup).
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether this error stems from configuration rather than the service.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::MissingVariable { .. })
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}
