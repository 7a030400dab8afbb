//! Ability score rolling and class optimization.
//!
//! Scores are rolled 4d6-drop-lowest, so every value lies in `[3, 18]`.
//! [`optimize`] then only *moves* rolled values between abilities, never
//! changes them, so the range survives optimization untouched.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::CharacterClass;

/// Lowest score a roll can produce.
pub const ROLL_MIN: u8 = 3;
/// Highest score a roll can produce.
pub const ROLL_MAX: u8 = 18;
/// Lowest score a stored record may carry.
pub const RECORD_MIN: u8 = 3;
/// Highest score a stored record may carry (rolls plus racial bonuses).
pub const RECORD_MAX: u8 = 20;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ability {
    /// Physical power.
    Strength,
    /// Agility and reflexes.
    Dexterity,
    /// Endurance.
    Constitution,
    /// Reasoning and memory.
    Intelligence,
    /// Perception and insight.
    Wisdom,
    /// Force of personality.
    Charisma,
}

impl Ability {
    /// All six abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Self::Strength,
        Self::Dexterity,
        Self::Constitution,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// JSON key for this ability.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Constitution => "constitution",
            Self::Intelligence => "intelligence",
            Self::Wisdom => "wisdom",
            Self::Charisma => "charisma",
        }
    }

    /// Title-cased label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Dexterity => "Dexterity",
            Self::Constitution => "Constitution",
            Self::Intelligence => "Intelligence",
            Self::Wisdom => "Wisdom",
            Self::Charisma => "Charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A full set of ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    /// Strength score.
    pub strength: u8,
    /// Dexterity score.
    pub dexterity: u8,
    /// Constitution score.
    pub constitution: u8,
    /// Intelligence score.
    pub intelligence: u8,
    /// Wisdom score.
    pub wisdom: u8,
    /// Charisma score.
    pub charisma: u8,
}

impl AbilityScores {
    /// Build a score set in sheet order.
    #[must_use]
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    /// Score for `ability`.
    #[must_use]
    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Set the score for `ability`.
    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// `(ability, score)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, u8)> + '_ {
        Ability::ALL.into_iter().map(|ability| (ability, self.get(ability)))
    }

    /// Sum of all six scores.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, score)| u32::from(score)).sum()
    }

    /// Exchange the scores of two abilities.
    pub fn swap(&mut self, a: Ability, b: Ability) {
        let (va, vb) = (self.get(a), self.get(b));
        self.set(a, vb);
        self.set(b, va);
    }
}

/// Ability modifier for a score: `floor((score - 10) / 2)`.
#[must_use]
pub fn modifier(score: u8) -> i16 {
    (i16::from(score) - 10).div_euclid(2)
}

/// Roll one score: four d6, drop the lowest.
pub fn roll_ability<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let mut dice = [0u8; 4];
    for die in &mut dice {
        *die = rng.gen_range(1..=6);
    }
    dice.sort_unstable();
    dice[1..].iter().sum()
}

/// Roll a full set of scores in sheet order.
pub fn roll_stats<R: Rng + ?Sized>(rng: &mut R) -> AbilityScores {
    let mut scores = AbilityScores::new(0, 0, 0, 0, 0, 0);
    for ability in Ability::ALL {
        scores.set(ability, roll_ability(rng));
    }
    scores
}

/// Rearrange `scores` so `class`'s primary abilities hold the highest values.
///
/// The first ability in [`CharacterClass::primary_abilities`] receives the
/// highest value, the second the next highest, and so on. Values are only
/// swapped, so the multiset of scores is unchanged.
#[must_use]
pub fn optimize(scores: AbilityScores, class: CharacterClass) -> AbilityScores {
    let mut ranked: Vec<u8> = scores.iter().map(|(_, score)| score).collect();
    ranked.sort_unstable_by(|a, b| b.cmp(a));

    let mut result = scores;
    let mut placed: Vec<Ability> = Vec::with_capacity(ranked.len());
    for (&ability, &target) in class.primary_abilities().iter().zip(&ranked) {
        if result.get(ability) != target {
            let donor = Ability::ALL
                .into_iter()
                .find(|a| *a != ability && !placed.contains(a) && result.get(*a) == target);
            if let Some(donor) = donor {
                result.swap(ability, donor);
            }
        }
        placed.push(ability);
    }
    result
}

/// Roll and optimize a score set for `class`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, class: CharacterClass) -> AbilityScores {
    let rolled = roll_stats(rng);
    let optimized = optimize(rolled, class);
    tracing::debug!(
        class = %class,
        total = optimized.total(),
        primary = %class.primary_ability(),
        "Rolled ability scores"
    );
    optimized
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let score = roll_ability(&mut rng);
            assert!((ROLL_MIN..=ROLL_MAX).contains(&score), "rolled {score}");
        }
    }

    #[test]
    fn optimize_moves_highest_to_primary() {
        let scores = AbilityScores::new(15, 8, 12, 10, 14, 13);
        let wizard = optimize(scores, CharacterClass::Wizard);
        assert_eq!(wizard.intelligence, 15);
        assert_eq!(wizard.constitution, 14);
        assert_eq!(wizard.total(), scores.total());
    }

    #[test]
    fn optimize_keeps_already_optimal_scores() {
        let scores = AbilityScores::new(17, 12, 15, 8, 10, 9);
        assert_eq!(optimize(scores, CharacterClass::Fighter), scores);
    }

    #[test]
    fn optimize_handles_ties() {
        let scores = AbilityScores::new(12, 12, 12, 12, 12, 12);
        assert_eq!(optimize(scores, CharacterClass::Bard), scores);

        let scores = AbilityScores::new(16, 16, 9, 9, 9, 9);
        let cleric = optimize(scores, CharacterClass::Cleric);
        assert_eq!(cleric.wisdom, 16);
        assert_eq!(cleric.constitution, 16);
    }

    #[test]
    fn generated_primary_ability_is_highest() {
        let mut rng = StdRng::seed_from_u64(42);
        for class in CharacterClass::ALL {
            let scores = generate(&mut rng, *class);
            let primary = scores.get(class.primary_ability());
            assert!(scores.iter().all(|(_, score)| score <= primary), "{class}: {scores:?}");
        }
    }

    #[test]
    fn modifier_table() {
        assert_eq!(modifier(3), -4);
        assert_eq!(modifier(8), -1);
        assert_eq!(modifier(9), -1);
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(16), 3);
        assert_eq!(modifier(20), 5);
    }

    #[test]
    fn scores_serialize_with_six_keys() {
        let value = serde_json::to_value(AbilityScores::new(10, 15, 12, 16, 13, 11)).expect("json");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 6);
        for ability in Ability::ALL {
            assert!(object.contains_key(ability.key()));
        }
    }
}
