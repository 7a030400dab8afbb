//! # charsmith Core Library
//!
//! Game-agnostic building blocks for tabletop character sheets.
//!
//! A [`Character`] is assembled once per invocation from:
//!
//! - **Catalogue**: the closed sets of races, classes, alignments and
//!   backstory depths (one shared table, see [`catalog`])
//! - **Stats**: six rolled ability scores nudged toward the class's
//!   primary attributes (see [`stats`])
//! - **Narrative**: name, background, equipment, features and spells, which
//!   are produced elsewhere (by a language model) and merged in verbatim
//!
//! Everything that touches a finished record (validation, JSON persistence
//! and human-readable rendering) lives here too, so the CLI and any other
//! front-end share exactly one set of invariants.
//!
//! ## Invariants
//!
//! - `1 <= level <= 20`
//! - Generated ability scores lie in `[3, 18]`; stored records accept `[3, 20]`
//! - `spells` is present only for spellcasting classes

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod persistence;
pub mod record;
pub mod stats;
pub mod validate;

pub use catalog::{Alignment, BackstoryDepth, CharacterClass, Race};
pub use config::CharsmithConfig;
pub use error::{CharsmithError, Result};
pub use format::OutputFormat;
pub use record::Character;
pub use stats::{Ability, AbilityScores};
