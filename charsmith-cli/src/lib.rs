//! # charsmith-cli: the `charsmith` command
//!
//! Collects race, class, alignment and backstory depth from flags or
//! interactive prompts, assembles a character through the model, prints it
//! and offers to save it. The pieces are exposed as a library so the whole
//! flow can be driven from tests with a scripted [`TextGenerator`] and an
//! in-memory console.
//!
//! [`TextGenerator`]: charsmith_llm::TextGenerator

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod generator;
pub mod interactive;
pub mod logging;
pub mod signals;

pub use cli::Cli;
pub use generator::{CharacterGenerator, CharacterRequest, GenerationSettings};
pub use interactive::{PromptError, Prompter};
