//! JSON file persistence for character records.
//!
//! Characters are stored one per file as UTF-8, 4-space-indented JSON under
//! a characters directory (`data/characters` by default):
//!
//! ```text
//! data/characters/
//!     ilyra_moonwhisper.json
//!     character_20261019_142233.json
//! ```
//!
//! - Every record is validated before it is written and after it is read.
//! - Writes go to a sibling `.tmp` file that is then renamed over the
//!   target, so an earlier save is never left half-overwritten.
//! - Missing files and malformed JSON are reported as different errors.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use crate::error::{CharsmithError, Result};
use crate::record::Character;

/// Characters stripped from file names.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows refuses as file stems.
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Turn arbitrary user input into a safe, lower-case file stem.
///
/// Illegal path characters and control characters are dropped, whitespace
/// runs become a single `_`, and leading/trailing dots and underscores are
/// trimmed. An empty result or a reserved device name is replaced by
/// `character_<YYYYMMDD_HHMMSS>`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_gap = false;
    for ch in name.chars() {
        if ILLEGAL_CHARS.contains(&ch) || (ch.is_control() && !ch.is_whitespace()) {
            continue;
        }
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        if pending_gap && !out.is_empty() {
            out.push('_');
        }
        pending_gap = false;
        out.extend(ch.to_lowercase());
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() || is_reserved(trimmed) {
        let fallback = fallback_name();
        debug!(input = %name, fallback = %fallback, "Using fallback file name");
        return fallback;
    }
    trimmed.to_string()
}

fn is_reserved(stem: &str) -> bool {
    let base = stem.split('.').next().unwrap_or(stem);
    RESERVED_NAMES.contains(&base)
}

fn fallback_name() -> String {
    format!("character_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write `character` as pretty JSON to `path`, creating parent directories.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`CharsmithError::Validation`] if the record is invalid (nothing
/// is written), or [`CharsmithError::Persistence`] on I/O failure.
pub fn save(character: &Character, path: impl AsRef<Path>) -> Result<PathBuf> {
    let start = Instant::now();
    let path = path.as_ref().to_path_buf();

    character.validate()?;
    let doc = character.to_value()?;
    crate::record::validate_document(&doc)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CharsmithError::Persistence {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let bytes = to_pretty_json(character)?;
    let tmp = tmp_path(&path);
    fs::write(&tmp, &bytes).map_err(|source| CharsmithError::Persistence {
        path: tmp.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp, &path) {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "Failed to clean up temporary file");
        }
        return Err(CharsmithError::Persistence { path, source });
    }

    info!(
        path = %path.display(),
        name = %character.name,
        bytes = bytes.len(),
        elapsed_us = start.elapsed().as_micros(),
        "Character saved"
    );
    Ok(path)
}

/// Read and validate a character file.
///
/// # Errors
///
/// - [`CharsmithError::NotFound`] if the file does not exist
/// - [`CharsmithError::MalformedFile`] if it is not valid JSON
/// - [`CharsmithError::Validation`] if the JSON has the wrong shape
/// - [`CharsmithError::Persistence`] on other I/O failures
pub fn load(path: impl AsRef<Path>) -> Result<Character> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CharsmithError::NotFound(path.to_path_buf())
        } else {
            CharsmithError::Persistence {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let doc: Value = serde_json::from_str(&text).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Character file is not valid JSON");
        CharsmithError::MalformedFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let character = Character::from_value(doc)?;
    debug!(path = %path.display(), name = %character.name, "Character loaded");
    Ok(character)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| CharsmithError::Serialization(e.to_string()))?;
    buf.push(b'\n');
    Ok(buf)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// CharacterStore
// ---------------------------------------------------------------------------

/// A directory of saved characters.
///
/// ```no_run
/// # use charsmith_core::persistence::CharacterStore;
/// # fn demo(character: &charsmith_core::Character) -> charsmith_core::Result<()> {
/// let store = CharacterStore::new("data/characters");
/// let path = store.save(character, None)?;
/// let again = charsmith_core::persistence::load(&path)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CharacterStore {
    root: PathBuf,
}

impl CharacterStore {
    /// A store rooted at `root`; the directory is created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a character would be saved under `filename` (or its own name).
    #[must_use]
    pub fn path_for(&self, character: &Character, filename: Option<&str>) -> PathBuf {
        let stem = match filename.map(str::trim).filter(|f| !f.is_empty()) {
            Some(given) => sanitize(given.strip_suffix(".json").unwrap_or(given)),
            None => sanitize(&character.name),
        };
        self.root.join(format!("{stem}.json"))
    }

    /// Save `character` as `<sanitized-name>.json` inside the store.
    ///
    /// # Errors
    /// See [`save`].
    pub fn save(&self, character: &Character, filename: Option<&str>) -> Result<PathBuf> {
        save(character, self.path_for(character, filename))
    }
}
