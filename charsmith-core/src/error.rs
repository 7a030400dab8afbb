//! Error types for the charsmith core library.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all charsmith operations.
#[derive(Error, Debug)]
pub enum CharsmithError {
    /// An input value or a record field violates the data model.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Which field failed (`race`, `stats.strength`, ...).
        field: String,
        /// Human-readable reason, listing valid options where applicable.
        message: String,
    },

    /// The language model call failed or returned unusable output.
    #[error("Character generation failed: {0}")]
    Generation(String),

    /// Filesystem failure while saving or loading a character.
    #[error("I/O error on {}: {source}", .path.display())]
    Persistence {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A character file that was asked for does not exist.
    #[error("Character file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A character file exists but is not valid JSON.
    #[error("Invalid character file format in {}: {reason}", .path.display())]
    MalformedFile {
        /// The offending file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Missing credential, unreadable config file or malformed prompt template.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CharsmithError {
    /// Build a [`CharsmithError::Validation`] for `field`.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error can be recovered from by asking the user again.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CharsmithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let err = CharsmithError::validation("race", "Must be one of: Elf, Dwarf");
        assert_eq!(err.to_string(), "Invalid race: Must be one of: Elf, Dwarf");
        assert!(err.is_validation());
    }

    #[test]
    fn persistence_error_carries_path() {
        let err = CharsmithError::Persistence {
            path: PathBuf::from("data/characters/x.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("data/characters/x.json"));
        assert!(!err.is_validation());
    }
}
