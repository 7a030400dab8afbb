//! LLM Client: OpenAI-compatible chat completions, async and blocking.
//!
//! [`LlmClient`] does the HTTP work on whatever tokio runtime the caller
//! provides. [`BlockingClient`] owns a current-thread runtime and exposes
//! the synchronous [`TextGenerator`] capability the rest of charsmith uses.
//! Requests are never retried.

use std::time::Instant;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::prompt::SYSTEM_PROMPT;
use crate::types::{CompletionRequest, CompletionResponse, LlmSettings};

/// Longest response body quoted in an HTTP error.
const ERROR_BODY_CHARS: usize = 500;

/// Text in, text out.
///
/// The one capability the character assembler needs from a model. Test
/// doubles implement it to script responses without a network.
pub trait TextGenerator {
    /// Complete `prompt`, returning the model's text.
    ///
    /// # Errors
    /// Returns an [`LlmError`] when the service fails or answers with nothing.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

/// Async client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    settings: LlmSettings,
    http: Client,
}

impl LlmClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] if the credential is empty or the
    /// HTTP client cannot be built.
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("API key is empty".into()));
        }
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { settings, http })
    }

    /// A request for `prompt` under the shared system prompt and these settings.
    #[must_use]
    pub fn request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            system: SYSTEM_PROMPT.into(),
            user: prompt.into(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Send one chat completion.
    ///
    /// # Errors
    /// - [`LlmError::Timeout`] / [`LlmError::Unavailable`] / [`LlmError::RequestFailed`]
    ///   when the request does not complete
    /// - [`LlmError::Http`] for a non-success status
    /// - [`LlmError::ParseError`] if the body is not a completion
    /// - [`LlmError::EmptyResponse`] if the completion has no text
    pub async fn generate(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let url = self.settings.endpoint();
        let body = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        debug!(
            model = %self.settings.model,
            prompt_chars = request.user.len(),
            "Sending completion"
        );
        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(timeout = ?self.settings.timeout, "LLM request timed out");
                    LlmError::Timeout(self.settings.timeout)
                } else {
                    warn!("LLM request failed: {e}");
                    LlmError::from(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body: String = text.chars().take(ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "LLM service returned an error");
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let tokens_generated = json["usage"]["completion_tokens"]
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        debug!(latency_ms, tokens_generated, "Completion received");

        Ok(CompletionResponse {
            text: text.to_string(),
            tokens_generated,
            latency_ms,
            model: json["model"]
                .as_str()
                .unwrap_or(self.settings.model.as_str())
                .to_string(),
        })
    }

    /// Complete `prompt` with the shared system prompt.
    ///
    /// # Errors
    /// See [`LlmClient::generate`].
    pub async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.generate(&self.request(prompt)).await?;
        Ok(response.text)
    }
}

/// Synchronous wrapper around [`LlmClient`].
///
/// Must not be created or dropped from inside an async context.
#[derive(Debug)]
pub struct BlockingClient {
    inner: LlmClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingClient {
    /// Create a blocking client with its own current-thread runtime.
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] if the client or runtime cannot be built.
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let inner = LlmClient::new(settings)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to start runtime: {e}")))?;
        Ok(Self { inner, runtime })
    }
}

impl TextGenerator for BlockingClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.runtime.block_on(self.inner.chat(prompt))
    }
}
