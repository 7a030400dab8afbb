//! Character assembly: rolled stats plus one model call per content block.
//!
//! ```text
//! CharacterRequest ──► stats ──► basic_info ──► background
//!                  ──► equipment ──► features ──► [spells]
//! ```
//!
//! Each block is rendered from its prompt template, sent through the
//! [`TextGenerator`], and parsed as JSON. Any failure aborts the whole
//! attempt; no partial character is returned.

use std::time::Instant;

use rand::Rng;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use charsmith_core::catalog::{Alignment, BackstoryDepth, CharacterClass, Race};
use charsmith_core::config::GenerationConfig;
use charsmith_core::record::is_blank;
use charsmith_core::{Character, CharsmithError, Result, stats, validate};
use charsmith_llm::{LlmError, PromptEngine, PromptKind, TextGenerator, parse_structured};

/// A validated generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterRequest {
    /// Ancestry.
    pub race: Race,
    /// Class.
    pub class: CharacterClass,
    /// Alignment.
    pub alignment: Alignment,
    /// Backstory length.
    pub backstory: BackstoryDepth,
    /// Level, `1..=20`.
    pub level: u8,
}

impl CharacterRequest {
    /// Validate raw inputs, stopping at the first bad one.
    ///
    /// Fields are checked in the order race, class, alignment, backstory,
    /// level.
    ///
    /// # Errors
    /// Returns [`CharsmithError::Validation`] naming the field and listing
    /// its valid options.
    pub fn new(
        race: &str,
        class: &str,
        alignment: &str,
        backstory: &str,
        level: u32,
    ) -> Result<Self> {
        Ok(Self {
            race: validate::require(race)?,
            class: validate::require(class)?,
            alignment: validate::require(alignment)?,
            backstory: validate::require(backstory)?,
            level: validate::require_level(level)?,
        })
    }
}

/// Word-count guidance for backstories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Word ceiling for `brief`.
    pub brief_word_limit: usize,
    /// Word floor for `detailed`.
    pub detailed_word_minimum: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            brief_word_limit: config.brief_word_limit,
            detailed_word_minimum: config.detailed_word_minimum,
        }
    }
}

impl GenerationSettings {
    /// Length instruction placed in the background prompt.
    #[must_use]
    pub fn word_guidance(&self, depth: BackstoryDepth) -> String {
        match depth {
            BackstoryDepth::Brief => {
                format!("fewer than {} words, a single short paragraph", self.brief_word_limit)
            }
            BackstoryDepth::Moderate => format!(
                "between {} and {} words, two or three paragraphs",
                self.brief_word_limit, self.detailed_word_minimum
            ),
            BackstoryDepth::Detailed => format!(
                "more than {} words, a full history with named people and places",
                self.detailed_word_minimum
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BasicInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Background {
    background: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Equipment {
    List(Vec<String>),
    Wrapped { equipment: Vec<String> },
}

impl Equipment {
    fn into_items(self) -> Vec<String> {
        let items = match self {
            Self::List(items) | Self::Wrapped { equipment: items } => items,
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Builds characters from a [`TextGenerator`].
pub struct CharacterGenerator<G> {
    generator: G,
    prompts: PromptEngine,
    settings: GenerationSettings,
}

impl<G: TextGenerator> CharacterGenerator<G> {
    /// Generator with the built-in prompts and default settings.
    pub fn new(generator: G) -> Self {
        Self::with_prompts(generator, PromptEngine::builtin(), GenerationSettings::default())
    }

    /// Generator with explicit prompts and settings.
    pub fn with_prompts(generator: G, prompts: PromptEngine, settings: GenerationSettings) -> Self {
        Self {
            generator,
            prompts,
            settings,
        }
    }

    /// The text generator in use.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a character using the thread RNG for stats.
    ///
    /// # Errors
    /// See [`CharacterGenerator::generate_with_rng`].
    pub fn generate(&self, request: &CharacterRequest) -> Result<Character> {
        self.generate_with_rng(request, &mut rand::thread_rng())
    }

    /// Generate a character, rolling stats from `rng`.
    ///
    /// # Errors
    /// - [`CharsmithError::Generation`] if a model call fails or its output
    ///   does not parse into the expected shape
    /// - [`CharsmithError::Config`] if a prompt template cannot be rendered
    /// - [`CharsmithError::Validation`] if the assembled record is invalid
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &CharacterRequest,
        rng: &mut R,
    ) -> Result<Character> {
        let race = request.race.as_str();
        let class = request.class.as_str();
        let alignment = request.alignment.as_str();
        let level = request.level.to_string();

        let stats = stats::generate(rng, request.class);

        let basic: BasicInfo = self.ask(
            PromptKind::BasicInfo,
            &[("race", race), ("class", class), ("alignment", alignment), ("level", &level)],
        )?;
        let name = basic.name.trim().to_string();
        if name.is_empty() {
            return Err(CharsmithError::Generation("model returned an empty name".into()));
        }

        let guidance = self.settings.word_guidance(request.backstory);
        let background: Background = self.ask(
            PromptKind::Background,
            &[
                ("name", &name),
                ("race", race),
                ("class", class),
                ("alignment", alignment),
                ("level", &level),
                ("depth", request.backstory.as_str()),
                ("word_guidance", &guidance),
            ],
        )?;
        let background = background.background.trim().to_string();
        self.check_length(request.backstory, &background);

        let equipment: Equipment = self.ask(
            PromptKind::Equipment,
            &[("race", race), ("class", class), ("alignment", alignment), ("level", &level)],
        )?;
        let equipment = equipment.into_items();
        if equipment.is_empty() {
            return Err(CharsmithError::Generation("model returned no equipment".into()));
        }

        let features: Value = self.ask(
            PromptKind::Features,
            &[("race", race), ("class", class), ("alignment", alignment), ("level", &level)],
        )?;

        let spells = if request.class.is_spellcaster() {
            let spells: Value =
                self.ask(PromptKind::Spells, &[("class", class), ("level", &level)])?;
            check_spell_levels(request.class, &spells)?;
            Some(spells)
        } else {
            None
        };

        let character = Character {
            name,
            race: request.race,
            class: request.class,
            alignment: request.alignment,
            level: request.level,
            stats,
            background,
            equipment,
            features,
            spells,
        };
        character.validate()?;
        info!(name = %character.name, race, class, "Character generated");
        Ok(character)
    }

    /// Render, complete and parse one block.
    fn ask<T: DeserializeOwned>(&self, kind: PromptKind, vars: &[(&str, &str)]) -> Result<T> {
        let prompt = self
            .prompts
            .render(kind, vars)
            .map_err(|e| CharsmithError::Config(e.to_string()))?;

        let start = Instant::now();
        let text = self.generator.complete(&prompt).map_err(|e| generation_error(kind, &e))?;
        debug!(
            %kind,
            prompt_chars = prompt.len(),
            response_chars = text.len(),
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Model call finished"
        );

        parse_structured(&text).map_err(|e| generation_error(kind, &e))
    }

    fn check_length(&self, depth: BackstoryDepth, background: &str) {
        let words = background.split_whitespace().count();
        if depth == BackstoryDepth::Brief && words > self.settings.brief_word_limit {
            warn!(
                words,
                limit = self.settings.brief_word_limit,
                "Brief backstory is longer than requested"
            );
        }
    }
}

fn generation_error(kind: PromptKind, err: &LlmError) -> CharsmithError {
    warn!(%kind, error = %err, "Model call failed");
    CharsmithError::Generation(format!("{kind}: {err}"))
}

/// Full casters know cantrips and first-level spells from level 1. Half
/// casters only need some non-empty spell level.
fn check_spell_levels(class: CharacterClass, spells: &Value) -> Result<()> {
    let missing = |what: &str| {
        CharsmithError::Generation(format!("model returned no {what} for a {class}"))
    };
    let Some(levels) = spells.as_object() else {
        return Err(missing("spell levels"));
    };
    let listed = |key: &str| {
        levels
            .get(key)
            .is_some_and(|list| list.is_array() && !is_blank(list))
    };

    if class.is_full_caster() {
        for key in ["cantrips", "level_1"] {
            if !listed(key) {
                return Err(missing(key));
            }
        }
        Ok(())
    } else if levels.keys().any(|key| listed(key.as_str())) {
        Ok(())
    } else {
        Err(missing("spells"))
    }
}
