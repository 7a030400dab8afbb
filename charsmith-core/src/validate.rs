//! Input validation against the closed option sets.
//!
//! Comparison always happens on the normalized form: surrounding whitespace
//! trimmed and each run of letters title-cased (`" half-ELF "` becomes
//! `"Half-Elf"`).

use crate::catalog::{self, CatalogEntry};
use crate::error::{CharsmithError, Result};

/// Lowest allowed character level.
pub const MIN_LEVEL: u32 = 1;
/// Highest allowed character level.
pub const MAX_LEVEL: u32 = 20;

/// Trim and title-case `value`.
///
/// A letter is upper-cased when it starts a run of letters and lower-cased
/// otherwise. When upper-casing expands a letter into several characters
/// (`ß` → `SS`) only the first stays upper-case, which keeps the function
/// idempotent.
#[must_use]
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.trim().chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                let mut upper = ch.to_uppercase();
                if let Some(first) = upper.next() {
                    out.push(first);
                }
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Whether `value` names a member of `allowed` once both are normalized.
#[must_use]
pub fn validate(value: &str, allowed: &[&str]) -> bool {
    let wanted = normalize(value);
    allowed.iter().any(|option| normalize(option) == wanted)
}

/// Parse `value` as a catalogue entry, failing with a message that lists
/// the valid options.
///
/// # Errors
/// Returns [`CharsmithError::Validation`] when `value` matches nothing.
pub fn require<T: CatalogEntry>(value: &str) -> Result<T> {
    catalog::parse_entry(value)
}

/// Check a requested level.
///
/// # Errors
/// Returns [`CharsmithError::Validation`] outside `1..=20`.
pub fn require_level(level: u32) -> Result<u8> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        u8::try_from(level).map_err(|e| CharsmithError::validation("level", e.to_string()))
    } else {
        Err(CharsmithError::validation(
            "level",
            format!("Level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {level}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Alignment, Race};

    const RACES: &[&str] = &["Elf", "Human", "Dwarf"];

    #[test]
    fn validate_input_cases() {
        let cases = [
            ("Elf", true),
            ("Elephant", false),
            ("", false),
            ("   Elf   ", true),
            ("elf", true),
        ];
        for (input, expected) in cases {
            assert_eq!(validate(input, RACES), expected, "input {input:?}");
        }
    }

    #[test]
    fn normalize_title_cases_each_word() {
        assert_eq!(normalize("  neutral GOOD "), "Neutral Good");
        assert_eq!(normalize("half-orc"), "Half-Orc");
        assert_eq!(normalize("com1abc"), "Com1Abc");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent_for_expanding_letters() {
        let once = normalize("straße");
        assert_eq!(normalize(&once), once);
        let once = normalize("ß");
        assert_eq!(once, "Ss");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn require_returns_typed_entry() {
        assert_eq!(require::<Race>("tiefling").expect("race"), Race::Tiefling);
        let err = require::<Alignment>("Neutral").expect_err("not an alignment");
        match err {
            CharsmithError::Validation { field, message } => {
                assert_eq!(field, "alignment");
                assert!(message.contains("True Neutral"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn level_bounds() {
        assert_eq!(require_level(1).expect("min"), 1);
        assert_eq!(require_level(20).expect("max"), 20);
        assert!(require_level(0).is_err());
        assert!(require_level(21).is_err());
    }
}
