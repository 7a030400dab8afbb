//! Configuration for charsmith.
//!
//! Maps directly to `charsmith.toml`; every field has a default so an empty
//! file (or no file at all) is a valid configuration. Environment variables
//! are applied on top with [`CharsmithConfig::apply_env`].
//!
//! ```toml
//! [llm]
//! model = "gpt-4"
//! max_tokens = 2000
//!
//! [generation]
//! brief_word_limit = 100
//!
//! [storage]
//! characters_dir = "data/characters"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CharsmithError, Result};

/// Environment variable holding the API credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding [`LlmConfig::model`].
pub const ENV_MODEL: &str = "OPENAI_MODEL";
/// Environment variable overriding [`LlmConfig::max_tokens`].
pub const ENV_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
/// Environment variable overriding [`LlmConfig::base_url`].
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Top-level charsmith configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharsmithConfig {
    /// Model endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Character generation tuning.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Where characters are saved.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// API credential; only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl CharsmithConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CharsmithError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CharsmithError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CharsmithError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| CharsmithError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply environment overrides, looking variables up through `lookup`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns `CharsmithError::Config` if `OPENAI_MAX_TOKENS` is not a
    /// positive integer.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(raw) = get(ENV_MAX_TOKENS) {
            self.llm.max_tokens = raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    CharsmithError::Config(format!(
                        "{ENV_MAX_TOKENS} must be a positive integer, got '{raw}'"
                    ))
                })?;
        }
        Ok(())
    }

    /// The API credential.
    ///
    /// # Errors
    /// Returns `CharsmithError::Config` if no credential was provided.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            CharsmithError::Config(format!("{ENV_API_KEY} not found in environment variables"))
        })
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Character generation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Level used when none is requested.
    #[serde(default = "default_level")]
    pub default_level: u32,
    /// Word ceiling asked for with a `brief` backstory.
    #[serde(default = "default_brief_word_limit")]
    pub brief_word_limit: usize,
    /// Word floor asked for with a `detailed` backstory.
    #[serde(default = "default_detailed_word_minimum")]
    pub detailed_word_minimum: usize,
    /// Optional directory of TOML prompt overrides.
    #[serde(default)]
    pub prompt_dir: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            brief_word_limit: default_brief_word_limit(),
            detailed_word_minimum: default_detailed_word_minimum(),
            prompt_dir: None,
        }
    }
}

/// Where characters are saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding saved character files.
    #[serde(default = "default_characters_dir")]
    pub characters_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            characters_dir: default_characters_dir(),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde requires named functions)
// ---------------------------------------------------------------------------

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-4".to_string()
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_level() -> u32 {
    1
}
fn default_brief_word_limit() -> usize {
    100
}
fn default_detailed_word_minimum() -> usize {
    200
}
fn default_characters_dir() -> PathBuf {
    PathBuf::from("data/characters")
}
fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CharsmithConfig::from_toml("").expect("parse");
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.max_tokens, 2000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.generation.brief_word_limit, 100);
        assert_eq!(config.storage.characters_dir, PathBuf::from("data/characters"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = CharsmithConfig::from_toml(
            "[llm]\nmodel = \"gpt-4o-mini\"\n\n[storage]\ncharacters_dir = \"saves\"\n",
        )
        .expect("parse");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.storage.characters_dir, PathBuf::from("saves"));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = CharsmithConfig::from_toml("[llm\nmodel=").expect_err("broken");
        assert!(matches!(err, CharsmithError::Config(_)));
    }

    #[test]
    fn api_key_file_entry_is_ignored() {
        let config = CharsmithConfig::from_toml("api_key = \"sk-from-file\"").expect("parse");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = CharsmithConfig::default();
        config
            .apply_env(env(&[
                (ENV_API_KEY, "sk-test"),
                (ENV_MODEL, "gpt-4o"),
                (ENV_MAX_TOKENS, "512"),
            ]))
            .expect("apply");
        assert_eq!(config.api_key().expect("key"), "sk-test");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 512);
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let mut config = CharsmithConfig::default();
        config.apply_env(env(&[(ENV_API_KEY, "  ")])).expect("apply");
        assert!(matches!(config.api_key(), Err(CharsmithError::Config(_))));
    }

    #[test]
    fn bad_max_tokens_is_config_error() {
        let mut config = CharsmithConfig::default();
        for raw in ["lots", "0", "-5"] {
            let err = config
                .apply_env(env(&[(ENV_MAX_TOKENS, raw)]))
                .expect_err(raw);
            assert!(matches!(err, CharsmithError::Config(_)));
        }
    }
}
