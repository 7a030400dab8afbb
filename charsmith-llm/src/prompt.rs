//! Prompt templates for character generation.
//!
//! Every prompt is a versioned, testable artifact. The compiled-in
//! templates below are used unless a prompt directory supplies TOML
//! overrides, one file per [`PromptKind`]:
//!
//! ```toml
//! [prompt]
//! version = "1.1"
//! template = """
//! Write a {depth} backstory for {name} ...
//! """
//! ```
//!
//! Placeholders are `{name}`; a literal brace is written `{{` or `}}`.
//! Rendering is strict: a placeholder with no value is an error.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::LlmError;

/// System prompt sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an expert Dungeons & Dragons 5th edition character designer. \
You always answer with a single valid JSON value and nothing else: no prose, no commentary.";

/// Name for a new character.
pub const BASIC_INFO_TEMPLATE: &str = r#"Create a new Dungeons & Dragons 5th edition character.

Race: {race}
Class: {class}
Alignment: {alignment}
Level: {level}

Invent an original name that suits the race and culture of this character.
Return JSON:
{{"name": "the character's full name"}}"#;

/// Backstory.
pub const BACKGROUND_TEMPLATE: &str = r#"Write a {depth} backstory for {name}, a level {level} {race} {class} of {alignment} alignment.

The backstory should be {word_guidance}.
Cover where they come from, what drove them to adventure as a {class}, and one unresolved tie to their past.
Their choices should reflect a {alignment} outlook.

Return JSON:
{{"background": "the backstory as plain prose"}}"#;

/// Starting equipment.
pub const EQUIPMENT_TEMPLATE: &str = r#"List the starting equipment for a level {level} {race} {class} in Dungeons & Dragons 5th edition.

Include weapons, armor, adventuring gear, and any class-specific focus or tools.
Return a JSON array of item names, one string per item:
["item", "item"]"#;

/// Racial and class features.
pub const FEATURES_TEMPLATE: &str = r#"List the racial and class features of a level {level} {race} {class} in Dungeons & Dragons 5th edition.

Return JSON:
{{"racial_features": [{{"name": "feature", "description": "one sentence"}}], "class_features": [{{"name": "feature", "description": "one sentence"}}]}}"#;

/// Spell selection, only for spellcasting classes.
pub const SPELLS_TEMPLATE: &str = r#"Choose a spell list for a level {level} {class} in Dungeons & Dragons 5th edition.

Only include spell levels this character can cast, and respect the number of cantrips and prepared or known spells for the class.
Return JSON keyed by spell level:
{{"cantrips": ["spell"], "level_1": ["spell"]}}"#;

// ---------------------------------------------------------------------------
// PromptKind
// ---------------------------------------------------------------------------

/// Identifies a prompt template by what it generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Character name.
    BasicInfo,
    /// Backstory.
    Background,
    /// Starting equipment.
    Equipment,
    /// Racial and class features.
    Features,
    /// Spell list.
    Spells,
}

impl PromptKind {
    /// All kinds, in generation order.
    pub const ALL: [PromptKind; 5] = [
        Self::BasicInfo,
        Self::Background,
        Self::Equipment,
        Self::Features,
        Self::Spells,
    ];

    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info.toml",
            Self::Background => "background.toml",
            Self::Equipment => "equipment.toml",
            Self::Features => "features.toml",
            Self::Spells => "spells.toml",
        }
    }

    /// Placeholders every template of this kind must use.
    #[must_use]
    pub fn required_vars(self) -> &'static [&'static str] {
        match self {
            Self::BasicInfo => &["race", "class", "alignment"],
            Self::Background => &["depth"],
            Self::Equipment | Self::Spells => &["class", "level"],
            Self::Features => &["race", "class", "level"],
        }
    }

    /// Placeholders a template of this kind may use.
    #[must_use]
    pub fn allowed_vars(self) -> &'static [&'static str] {
        match self {
            Self::BasicInfo | Self::Equipment | Self::Features => {
                &["race", "class", "alignment", "level"]
            }
            Self::Background => &[
                "name",
                "race",
                "class",
                "alignment",
                "level",
                "depth",
                "word_guidance",
            ],
            Self::Spells => &["class", "level"],
        }
    }

    fn builtin_template(self) -> &'static str {
        match self {
            Self::BasicInfo => BASIC_INFO_TEMPLATE,
            Self::Background => BACKGROUND_TEMPLATE,
            Self::Equipment => EQUIPMENT_TEMPLATE,
            Self::Features => FEATURES_TEMPLATE,
            Self::Spells => SPELLS_TEMPLATE,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::Background => "background",
            Self::Equipment => "equipment",
            Self::Features => "features",
            Self::Spells => "spells",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LlmError::ConfigError(format!("unknown prompt kind: '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

enum Piece<'a> {
    Text(&'a str),
    Var(&'a str),
}

/// Split a template into literal text and placeholders.
fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                out.push(Piece::Text(&template[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let name_len = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || **b == b'_')
                    .count();
                if name_len > 0 && bytes.get(i + 1 + name_len) == Some(&b'}') {
                    out.push(Piece::Text(&template[literal_start..i]));
                    out.push(Piece::Var(&template[i + 1..=i + name_len]));
                    i += name_len + 2;
                    literal_start = i;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    out.push(Piece::Text(&template[literal_start..]));
    out
}

/// Placeholder names used by `template`, in order of first use.
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for piece in pieces(template) {
        if let Piece::Var(name) = piece {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Fill `{key}` placeholders from `vars` and unescape `{{`/`}}`.
///
/// # Errors
/// Returns [`LlmError::MissingVariable`] naming the first placeholder
/// without a value; `template_name` identifies the template in the error.
pub fn render_template(
    template_name: &str,
    template: &str,
    vars: &[(&str, &str)],
) -> Result<String, LlmError> {
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Var(name) => {
                let (_, value) = vars.iter().find(|(key, _)| *key == name).ok_or_else(|| {
                    LlmError::MissingVariable {
                        template: template_name.to_string(),
                        name: name.to_string(),
                    }
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// PromptEngine
// ---------------------------------------------------------------------------

/// `[prompt]` section of a TOML override file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    template: String,
}

/// A loaded, checked prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Version string (`builtin` for compiled-in templates).
    pub version: String,
    /// Template text with `{key}` placeholders.
    pub template: String,
}

/// Holds one template per [`PromptKind`] and renders them.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptKind, PromptTemplate>,
}

impl PromptEngine {
    /// Engine with the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = PromptKind::ALL
            .into_iter()
            .map(|kind| {
                (kind, PromptTemplate {
                    version: "builtin".into(),
                    template: kind.builtin_template().into(),
                })
            })
            .collect();
        Self { templates }
    }

    /// Built-in templates, overridden by any `<kind>.toml` found in `dir`.
    ///
    /// Unknown files are ignored. Every override is checked against the
    /// placeholders its kind requires and allows.
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] if `dir` is not a directory or an
    /// override cannot be read, parsed, or checked.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LlmError::ConfigError(format!(
                "prompt directory not found: {}",
                dir.display()
            )));
        }

        let mut engine = Self::builtin();
        for kind in PromptKind::ALL {
            let path = dir.join(kind.filename());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                LlmError::ConfigError(format!("failed to parse {}: {e}", path.display()))
            })?;
            check_template(kind, &parsed.prompt.template)
                .map_err(|e| LlmError::ConfigError(format!("{}: {e}", path.display())))?;

            debug!(%kind, version = %parsed.prompt.version, "Loaded prompt override");
            engine.templates.insert(kind, PromptTemplate {
                version: parsed.prompt.version,
                template: parsed.prompt.template,
            });
        }
        Ok(engine)
    }

    /// The template for `kind`.
    #[must_use]
    pub fn get(&self, kind: PromptKind) -> Option<&PromptTemplate> {
        self.templates.get(&kind)
    }

    /// Render the template for `kind`.
    ///
    /// # Errors
    /// Returns [`LlmError::MissingVariable`] if `vars` lacks a placeholder
    /// the template uses, or [`LlmError::ConfigError`] if `kind` is not loaded.
    pub fn render(&self, kind: PromptKind, vars: &[(&str, &str)]) -> Result<String, LlmError> {
        let tpl = self
            .get(kind)
            .ok_or_else(|| LlmError::ConfigError(format!("prompt template '{kind}' not loaded")))?;
        render_template(kind.as_str(), &tpl.template, vars)
    }
}

fn check_template(kind: PromptKind, template: &str) -> Result<(), String> {
    let used = placeholders(template);
    if let Some(unknown) = used.iter().find(|name| !kind.allowed_vars().contains(name)) {
        return Err(format!(
            "unknown placeholder {{{unknown}}}; allowed: {}",
            kind.allowed_vars().join(", ")
        ));
    }
    if let Some(missing) = kind.required_vars().iter().find(|name| !used.contains(name)) {
        return Err(format!("template must use placeholder {{{missing}}}"));
    }
    Ok(())
}
