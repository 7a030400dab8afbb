//! One CLI invocation: configuration, input collection, generation, display
//! and saving.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use charsmith_core::catalog::{Alignment, BackstoryDepth, CharacterClass, Race};
use charsmith_core::persistence::{self, CharacterStore};
use charsmith_core::{Character, CharsmithConfig, CharsmithError, format, validate};
use charsmith_llm::{BlockingClient, LlmSettings, PromptEngine, TextGenerator};

use crate::cli::{Cli, DisplayFormat};
use crate::generator::{CharacterGenerator, CharacterRequest};
use crate::interactive::Prompter;
use crate::logging;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "charsmith.toml";

const SAVE_QUESTION: &str = "Would you like to save this character? (yes/no)";
const FILENAME_QUESTION: &str = "Enter a filename (press Enter to use the character's name): ";

/// Run the CLI against the real console, environment and model service.
///
/// # Errors
/// Any configuration, validation, generation or I/O failure.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config(cli, |key| std::env::var(key).ok())?;
    let _log = logging::init(&config.logging.log_level);

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    if let Some(path) = &cli.load {
        return show_saved(path, cli.format, prompter.output());
    }

    let api_key = config.api_key()?.to_string();
    let prompts = load_prompts(&config)?;
    let client = BlockingClient::new(llm_settings(&config, api_key))
        .map_err(|e| CharsmithError::Config(e.to_string()))?;
    let generator =
        CharacterGenerator::with_prompts(client, prompts, (&config.generation).into());

    create(cli, &config, &generator, &mut prompter)?;
    Ok(())
}

/// Defaults, then the config file, then environment overrides.
///
/// # Errors
/// Returns [`CharsmithError::Config`] if the file or an override is invalid.
pub fn load_config<F>(cli: &Cli, lookup: F) -> Result<CharsmithConfig, CharsmithError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config {
        Some(path) => CharsmithConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            CharsmithConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => CharsmithConfig::default(),
    };
    config.apply_env(lookup)?;
    Ok(config)
}

/// Built-in prompts, or the configured override directory.
///
/// # Errors
/// Returns [`CharsmithError::Config`] if an override is unreadable or invalid.
pub fn load_prompts(config: &CharsmithConfig) -> Result<PromptEngine, CharsmithError> {
    match &config.generation.prompt_dir {
        Some(dir) => {
            PromptEngine::from_directory(dir).map_err(|e| CharsmithError::Config(e.to_string()))
        }
        None => Ok(PromptEngine::builtin()),
    }
}

/// Client settings from configuration.
#[must_use]
pub fn llm_settings(config: &CharsmithConfig, api_key: String) -> LlmSettings {
    LlmSettings {
        base_url: config.llm.base_url.clone(),
        api_key,
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        timeout: Duration::from_secs(config.llm.timeout_secs),
    }
}

/// Validate the flags that were given, then ask for the rest.
///
/// The backstory depth is only asked for in an interactive session, that is
/// when race, class or alignment had to be prompted. Otherwise a missing
/// `--backstory` means the default depth.
///
/// # Errors
/// A validation error for a bad flag, or a prompt error if the user quits.
pub fn collect_request<R: BufRead, W: Write>(
    cli: &Cli,
    config: &CharsmithConfig,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<CharacterRequest> {
    let race = cli.race.as_deref().map(validate::require::<Race>).transpose()?;
    let class = cli.class.as_deref().map(validate::require::<CharacterClass>).transpose()?;
    let alignment = cli
        .alignment
        .as_deref()
        .map(validate::require::<Alignment>)
        .transpose()?;
    let backstory = cli
        .backstory
        .as_deref()
        .map(validate::require::<BackstoryDepth>)
        .transpose()?;
    let level = validate::require_level(cli.level.unwrap_or(config.generation.default_level))?;
    let interactive = race.is_none() || class.is_none() || alignment.is_none();

    Ok(CharacterRequest {
        race: match race {
            Some(race) => race,
            None => prompter.choose("race")?,
        },
        class: match class {
            Some(class) => class,
            None => prompter.choose("class")?,
        },
        alignment: match alignment {
            Some(alignment) => alignment,
            None => prompter.choose("alignment")?,
        },
        backstory: match backstory {
            Some(depth) => depth,
            None if interactive => {
                prompter.choose_or("backstory depth", BackstoryDepth::default())?
            }
            None => BackstoryDepth::default(),
        },
        level,
    })
}

/// Render `character` for the console.
///
/// # Errors
/// Returns a validation error for an invalid record.
pub fn display(character: &Character, mode: DisplayFormat) -> anyhow::Result<String> {
    match mode.sheet() {
        Some(sheet) => Ok(format::render(character, sheet)?),
        None => {
            character.validate()?;
            Ok(serde_json::to_string_pretty(character)?)
        }
    }
}

/// Load a saved character and print it.
///
/// # Errors
/// Load or render failures.
pub fn show_saved<W: Write>(path: &Path, mode: DisplayFormat, out: &mut W) -> anyhow::Result<()> {
    let character = persistence::load(path)?;
    writeln!(out, "{}", display(&character, mode)?)?;
    Ok(())
}

/// Collect inputs, generate, print, and save if asked to.
///
/// Returns where the character was saved, if it was.
///
/// # Errors
/// Any validation, generation, prompt or save failure.
pub fn create<G, R, W>(
    cli: &Cli,
    config: &CharsmithConfig,
    generator: &CharacterGenerator<G>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<Option<PathBuf>>
where
    G: TextGenerator,
    R: BufRead,
    W: Write,
{
    let request = collect_request(cli, config, prompter)?;
    info!(
        race = %request.race,
        class = %request.class,
        level = request.level,
        "Generating character"
    );
    let character = generator.generate(&request)?;
    writeln!(prompter.output(), "{}", display(&character, cli.format)?)?;

    let filename = if cli.save {
        cli.filename.clone()
    } else if prompter.confirm(SAVE_QUESTION)? {
        match &cli.filename {
            Some(name) => Some(name.clone()),
            None => prompter.optional(FILENAME_QUESTION)?,
        }
    } else {
        return Ok(None);
    };

    let store = CharacterStore::new(&config.storage.characters_dir);
    let path = store
        .save(&character, filename.as_deref())
        .context("could not save character")?;
    writeln!(prompter.output(), "Character saved to {}", path.display())?;
    Ok(Some(path))
}
