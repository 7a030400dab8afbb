//! The character record and its shape checks.
//!
//! Two entry points share the same rules:
//!
//! - [`Character::validate`] for a typed, in-memory record
//! - [`validate_document`] for raw JSON read from disk, which can be missing
//!   fields or carry the wrong types and must still fail with an error naming
//!   the offending field rather than a parser message

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Alignment, CharacterClass, Race};
use crate::error::{CharsmithError, Result};
use crate::stats::{Ability, AbilityScores, RECORD_MAX, RECORD_MIN};
use crate::validate::{self, MAX_LEVEL, MIN_LEVEL};

/// A fully assembled character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Character name.
    pub name: String,
    /// Ancestry.
    pub race: Race,
    /// Class.
    #[serde(rename = "class")]
    pub class: CharacterClass,
    /// Alignment.
    pub alignment: Alignment,
    /// Level, `1..=20`.
    #[serde(default = "default_level")]
    pub level: u8,
    /// Ability scores.
    pub stats: AbilityScores,
    /// Backstory text.
    pub background: String,
    /// Starting equipment, in the order the model listed it.
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Racial and class features, shape decided by the model.
    #[serde(default)]
    pub features: Value,
    /// Spell list, only for spellcasting classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells: Option<Value>,
}

fn default_level() -> u8 {
    1
}

impl Character {
    /// Check the record's invariants.
    ///
    /// # Errors
    /// Returns [`CharsmithError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CharsmithError::validation("name", "Name must not be empty"));
        }
        validate::require_level(u32::from(self.level))?;
        for (ability, score) in self.stats.iter() {
            check_score(ability, i64::from(score))?;
        }
        match &self.spells {
            Some(Value::Null) => Err(CharsmithError::validation(
                "spells",
                "Spells must be omitted rather than null",
            )),
            Some(spells) => check_spells(self.class, spells),
            None => Ok(()),
        }
    }

    /// Serialize to a JSON value.
    ///
    /// # Errors
    /// Returns [`CharsmithError::Serialization`] if encoding fails.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| CharsmithError::Serialization(e.to_string()))
    }

    /// Validate a raw JSON document and convert it into a record.
    ///
    /// # Errors
    /// Returns [`CharsmithError::Validation`] if the document's shape is wrong.
    pub fn from_value(value: Value) -> Result<Self> {
        validate_document(&value)?;
        let character: Self = serde_json::from_value(value)
            .map_err(|e| CharsmithError::validation("record", e.to_string()))?;
        character.validate()?;
        Ok(character)
    }
}

/// Fields every stored record must carry, with their expected JSON kind.
const REQUIRED_FIELDS: &[(&str, Kind)] = &[
    ("name", Kind::String),
    ("race", Kind::String),
    ("class", Kind::String),
    ("alignment", Kind::String),
    ("stats", Kind::Object),
    ("background", Kind::String),
];

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Object,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Object => "object",
        }
    }
}

fn check_score(ability: Ability, score: i64) -> Result<()> {
    if (i64::from(RECORD_MIN)..=i64::from(RECORD_MAX)).contains(&score) {
        Ok(())
    } else {
        Err(CharsmithError::validation(
            format!("stats.{}", ability.key()),
            format!("Must be between {RECORD_MIN} and {RECORD_MAX}, got {score}"),
        ))
    }
}

/// Check the shape of a raw character document.
///
/// # Errors
/// Returns [`CharsmithError::Validation`] naming the first missing or
/// ill-typed field, unknown catalogue value, or out-of-range stat.
pub fn validate_document(doc: &Value) -> Result<()> {
    let Some(object) = doc.as_object() else {
        return Err(CharsmithError::validation("record", "Expected a JSON object"));
    };

    for (field, kind) in REQUIRED_FIELDS {
        let Some(value) = object.get(*field) else {
            return Err(CharsmithError::validation(
                *field,
                format!("Missing required field: {field}"),
            ));
        };
        if !kind.matches(value) {
            return Err(CharsmithError::validation(
                *field,
                format!("Expected {}", kind.name()),
            ));
        }
    }

    if object.get("name").and_then(Value::as_str).is_some_and(|s| s.trim().is_empty()) {
        return Err(CharsmithError::validation("name", "Name must not be empty"));
    }
    if let Some(race) = object.get("race").and_then(Value::as_str) {
        validate::require::<Race>(race)?;
    }
    let class = object
        .get("class")
        .and_then(Value::as_str)
        .map(validate::require::<CharacterClass>)
        .transpose()?;
    if let Some(alignment) = object.get("alignment").and_then(Value::as_str) {
        validate::require::<Alignment>(alignment)?;
    }

    if let Some(level) = object.get("level") {
        let in_range = level
            .as_u64()
            .is_some_and(|l| (u64::from(MIN_LEVEL)..=u64::from(MAX_LEVEL)).contains(&l));
        if !in_range {
            return Err(CharsmithError::validation(
                "level",
                format!("Level must be an integer between {MIN_LEVEL} and {MAX_LEVEL}"),
            ));
        }
    }

    if let Some(stats) = object.get("stats").and_then(Value::as_object) {
        for ability in Ability::ALL {
            let Some(raw) = stats.get(ability.key()) else {
                return Err(CharsmithError::validation(
                    format!("stats.{}", ability.key()),
                    format!("Missing stat: {}", ability.key()),
                ));
            };
            let Some(score) = raw.as_i64() else {
                return Err(CharsmithError::validation(
                    format!("stats.{}", ability.key()),
                    "Expected an integer",
                ));
            };
            check_score(ability, score)?;
        }
    }

    if let Some(equipment) = object.get("equipment") {
        let well_formed = equipment
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !well_formed {
            return Err(CharsmithError::validation(
                "equipment",
                "Expected a list of strings",
            ));
        }
    }

    if let (Some(class), Some(spells)) = (class, object.get("spells")) {
        check_spells(class, spells)?;
    }

    Ok(())
}

/// Whether a model-shaped block carries nothing: null, `{}`, `[]` or blank text.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Only spellcasting classes may carry a non-empty spells block.
fn check_spells(class: CharacterClass, spells: &Value) -> Result<()> {
    if class.is_spellcaster() || is_blank(spells) {
        Ok(())
    } else {
        Err(CharsmithError::validation(
            "spells",
            format!("{class} is not a spellcasting class"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "Test Character",
            "race": "Elf",
            "class": "Wizard",
            "alignment": "Neutral Good",
            "stats": {
                "strength": 10,
                "dexterity": 15,
                "constitution": 12,
                "intelligence": 16,
                "wisdom": 13,
                "charisma": 11
            },
            "background": "Test background"
        })
    }

    fn field_of(err: CharsmithError) -> String {
        match err {
            CharsmithError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn valid_document_passes() {
        validate_document(&sample()).expect("valid");
        let character = Character::from_value(sample()).expect("convert");
        assert_eq!(character.level, 1);
        assert!(character.equipment.is_empty());
        assert!(character.spells.is_none());
    }

    #[test]
    fn empty_document_names_first_field() {
        let err = validate_document(&json!({})).expect_err("empty");
        assert_eq!(field_of(err), "name");
    }

    #[test]
    fn missing_fields_are_named() {
        for field in ["race", "class", "alignment", "stats", "background"] {
            let mut doc = sample();
            doc.as_object_mut().expect("object").remove(field);
            let err = validate_document(&doc).expect_err(field);
            assert_eq!(field_of(err), field);
        }
    }

    #[test]
    fn null_stats_rejected() {
        let mut doc = sample();
        doc["stats"] = Value::Null;
        assert_eq!(field_of(validate_document(&doc).expect_err("null")), "stats");
    }

    #[test]
    fn out_of_range_stat_rejected() {
        let mut doc = sample();
        doc["stats"]["wisdom"] = json!(21);
        assert_eq!(
            field_of(validate_document(&doc).expect_err("21")),
            "stats.wisdom"
        );
        doc["stats"]["wisdom"] = json!(2);
        assert!(validate_document(&doc).is_err());
        doc["stats"]["wisdom"] = json!(20);
        validate_document(&doc).expect("20 is allowed on records");
    }

    #[test]
    fn missing_stat_rejected() {
        let mut doc = sample();
        doc["stats"].as_object_mut().expect("stats").remove("charisma");
        assert_eq!(
            field_of(validate_document(&doc).expect_err("missing")),
            "stats.charisma"
        );
    }

    #[test]
    fn unknown_alignment_rejected() {
        let mut doc = sample();
        doc["alignment"] = json!("Invalid");
        assert_eq!(
            field_of(validate_document(&doc).expect_err("alignment")),
            "alignment"
        );
    }

    #[test]
    fn bad_level_rejected() {
        let mut doc = sample();
        doc["level"] = json!(0);
        assert_eq!(field_of(validate_document(&doc).expect_err("level")), "level");
        doc["level"] = json!("three");
        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn typed_validate_checks_name_and_stats() {
        let mut character = Character::from_value(sample()).expect("convert");
        character.validate().expect("valid");
        character.name = "  ".into();
        assert_eq!(field_of(character.validate().expect_err("name")), "name");
        character.name = "Ilyra".into();
        character.stats.strength = 25;
        assert_eq!(
            field_of(character.validate().expect_err("stat")),
            "stats.strength"
        );
    }

    #[test]
    fn spells_omitted_when_absent() {
        let character = Character::from_value(sample()).expect("convert");
        let value = character.to_value().expect("json");
        assert!(value.get("spells").is_none());
        assert_eq!(value["class"], "Wizard");
    }

    #[test]
    fn spells_only_for_spellcasters() {
        let mut character = Character::from_value(sample()).expect("convert");
        character.spells = Some(json!({ "cantrips": ["Fire Bolt"] }));
        character.validate().expect("wizard casts");

        character.class = CharacterClass::Fighter;
        assert_eq!(field_of(character.validate().expect_err("fighter")), "spells");

        character.spells = Some(json!({}));
        character.validate().expect("empty block is allowed");
    }

    #[test]
    fn null_spells_rejected_in_memory() {
        let mut character = Character::from_value(sample()).expect("convert");
        character.spells = Some(Value::Null);
        assert_eq!(field_of(character.validate().expect_err("null")), "spells");
    }

    #[test]
    fn document_spells_checked_against_class() {
        let mut doc = sample();
        doc["class"] = json!("fighter");
        doc["spells"] = json!({ "cantrips": ["Fire Bolt"] });
        assert_eq!(field_of(validate_document(&doc).expect_err("fighter")), "spells");

        doc["spells"] = Value::Null;
        let character = Character::from_value(doc).expect("null reads as absent");
        assert!(character.spells.is_none());
    }

    #[test]
    fn blank_blocks() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!("  ")));
        assert!(!is_blank(&json!(["Light"])));
        assert!(!is_blank(&json!(0)));
    }
}
