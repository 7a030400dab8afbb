//! The closed option sets a character is built from.
//!
//! Races, classes, alignments and backstory depths are declared once, here,
//! through [`catalog!`]. Every enum gets the same surface: a canonical
//! spelling, an `ALL` table in canonical order, case- and
//! whitespace-insensitive parsing, and serde as the canonical string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CharsmithError;
use crate::stats::Ability;
use crate::validate::normalize;

/// Shared behaviour of every catalogue enum.
pub trait CatalogEntry: Copy + FromStr<Err = CharsmithError> + fmt::Display + 'static {
    /// Field name used in validation messages (`race`, `class`, ...).
    const FIELD: &'static str;

    /// Every member, in canonical order.
    fn all() -> &'static [Self];

    /// Canonical spelling.
    fn as_str(self) -> &'static str;

    /// Canonical spellings of every member.
    #[must_use]
    fn names() -> Vec<&'static str> {
        Self::all().iter().map(|entry| entry.as_str()).collect()
    }
}

/// Look up `value` in `T`'s table after normalization.
///
/// # Errors
/// Returns [`CharsmithError::Validation`] listing the valid options.
pub fn parse_entry<T: CatalogEntry>(value: &str) -> Result<T, CharsmithError> {
    let wanted = normalize(value);
    if !wanted.is_empty() {
        for entry in T::all() {
            if normalize(entry.as_str()) == wanted {
                return Ok(*entry);
            }
        }
    }
    Err(CharsmithError::validation(
        T::FIELD,
        format!("Must be one of: {}", T::names().join(", ")),
    ))
}

macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every member, in canonical order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical spelling.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl CatalogEntry for $name {
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn as_str(self) -> &'static str {
                $name::as_str(self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CharsmithError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_entry(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

catalog! {
    /// Playable ancestry.
    Race, "race" {
        /// Dragonborn.
        Dragonborn => "Dragonborn",
        /// Dwarf.
        Dwarf => "Dwarf",
        /// Elf.
        Elf => "Elf",
        /// Gnome.
        Gnome => "Gnome",
        /// Half-Elf.
        HalfElf => "Half-Elf",
        /// Half-Orc.
        HalfOrc => "Half-Orc",
        /// Halfling.
        Halfling => "Halfling",
        /// Human.
        Human => "Human",
        /// Tiefling.
        Tiefling => "Tiefling",
    }
}

catalog! {
    /// Character class.
    CharacterClass, "class" {
        /// Barbarian.
        Barbarian => "Barbarian",
        /// Bard.
        Bard => "Bard",
        /// Cleric.
        Cleric => "Cleric",
        /// Druid.
        Druid => "Druid",
        /// Fighter.
        Fighter => "Fighter",
        /// Monk.
        Monk => "Monk",
        /// Paladin.
        Paladin => "Paladin",
        /// Ranger.
        Ranger => "Ranger",
        /// Rogue.
        Rogue => "Rogue",
        /// Sorcerer.
        Sorcerer => "Sorcerer",
        /// Warlock.
        Warlock => "Warlock",
        /// Wizard.
        Wizard => "Wizard",
    }
}

catalog! {
    /// Moral and ethical outlook.
    Alignment, "alignment" {
        /// Lawful Good.
        LawfulGood => "Lawful Good",
        /// Neutral Good.
        NeutralGood => "Neutral Good",
        /// Chaotic Good.
        ChaoticGood => "Chaotic Good",
        /// Lawful Neutral.
        LawfulNeutral => "Lawful Neutral",
        /// True Neutral.
        TrueNeutral => "True Neutral",
        /// Chaotic Neutral.
        ChaoticNeutral => "Chaotic Neutral",
        /// Lawful Evil.
        LawfulEvil => "Lawful Evil",
        /// Neutral Evil.
        NeutralEvil => "Neutral Evil",
        /// Chaotic Evil.
        ChaoticEvil => "Chaotic Evil",
    }
}

catalog! {
    /// How much backstory to ask the model for.
    BackstoryDepth, "backstory" {
        /// A short paragraph.
        Brief => "brief",
        /// A few paragraphs.
        Moderate => "moderate",
        /// A full history.
        Detailed => "detailed",
    }
}

impl Default for BackstoryDepth {
    fn default() -> Self {
        Self::Moderate
    }
}

impl CharacterClass {
    /// Whether this class gets a spells block.
    #[must_use]
    pub fn is_spellcaster(self) -> bool {
        matches!(
            self,
            Self::Bard
                | Self::Cleric
                | Self::Druid
                | Self::Paladin
                | Self::Ranger
                | Self::Sorcerer
                | Self::Warlock
                | Self::Wizard
        )
    }

    /// Whether this class casts cantrips and first-level spells from level 1.
    #[must_use]
    pub fn is_full_caster(self) -> bool {
        self.is_spellcaster() && !matches!(self, Self::Paladin | Self::Ranger)
    }

    /// Abilities this class leans on, most important first.
    ///
    /// The optimizer hands the highest rolls out in this order.
    #[must_use]
    pub fn primary_abilities(self) -> &'static [Ability] {
        use Ability::{Charisma, Constitution, Dexterity, Intelligence, Strength, Wisdom};
        match self {
            Self::Barbarian => &[Strength, Constitution],
            Self::Bard => &[Charisma, Dexterity],
            Self::Cleric => &[Wisdom, Constitution],
            Self::Druid => &[Wisdom, Constitution],
            Self::Fighter => &[Strength, Constitution],
            Self::Monk => &[Dexterity, Wisdom],
            Self::Paladin => &[Strength, Charisma],
            Self::Ranger => &[Dexterity, Wisdom],
            Self::Rogue => &[Dexterity, Intelligence],
            Self::Sorcerer => &[Charisma, Constitution],
            Self::Warlock => &[Charisma, Constitution],
            Self::Wizard => &[Intelligence, Constitution],
        }
    }

    /// The single ability the optimizer favours above all others.
    #[must_use]
    pub fn primary_ability(self) -> Ability {
        self.primary_abilities()[0]
    }
}
