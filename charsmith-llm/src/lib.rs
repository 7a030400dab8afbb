//! # charsmith-llm: Language Model Layer for charsmith
//!
//! Everything charsmith knows about talking to a text-generation service
//! lives in this crate:
//!
//! - **Prompts**: one template per content category, rendered strictly
//!   (a placeholder without a value is an error, never left in the text)
//! - **Client**: an OpenAI-compatible chat-completions client
//! - **Parsing**: model text to typed JSON, tolerating a Markdown code fence
//!
//! Callers depend only on the narrow [`TextGenerator`] capability
//! (text in, text out), so the character assembler and its tests never see
//! HTTP, and a test double can stand in for the real service.
//!
//! ```text
//! PromptEngine::render(kind, vars)
//!     ──► TextGenerator::complete(prompt)
//!     ──► parse_structured::<T>(text)
//! ```

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod types;

pub use client::{BlockingClient, LlmClient, TextGenerator};
pub use error::LlmError;
pub use parse::parse_structured;
pub use prompt::{PromptEngine, PromptKind};
pub use types::{CompletionRequest, CompletionResponse, LlmSettings};
