//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use charsmith_core::OutputFormat;

/// Create tabletop RPG characters with rolled stats and model-written details.
///
/// Any of race, class, alignment or backstory left out is asked for
/// interactively.
#[derive(Debug, Parser)]
#[command(name = "charsmith", version, about)]
pub struct Cli {
    /// Character race (e.g. Elf, Half-Orc)
    #[arg(long)]
    pub race: Option<String>,

    /// Character class (e.g. Wizard, Fighter)
    #[arg(long = "class")]
    pub class: Option<String>,

    /// Character alignment (e.g. "Neutral Good")
    #[arg(long)]
    pub alignment: Option<String>,

    /// Backstory length: brief, moderate or detailed
    #[arg(long)]
    pub backstory: Option<String>,

    /// Character level, 1 to 20 (defaults to the configured level)
    #[arg(long)]
    pub level: Option<u32>,

    /// How to display the character
    #[arg(long, value_enum, default_value_t = DisplayFormat::Json)]
    pub format: DisplayFormat,

    /// Path to a TOML config file (default: ./charsmith.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save without asking
    #[arg(long)]
    pub save: bool,

    /// File name for the saved character (default: derived from its name)
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Display a saved character instead of creating one
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with_all = [
            "race", "class", "alignment", "backstory", "level", "save", "filename"
        ]
    )]
    pub load: Option<PathBuf>,
}

/// Console display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayFormat {
    /// Pretty-printed JSON record
    Json,
    /// Plain text sheet
    Text,
    /// Markdown sheet
    Markdown,
    /// HTML fragment
    Html,
}

impl DisplayFormat {
    /// The sheet renderer for this format, `None` for raw JSON.
    #[must_use]
    pub fn sheet(self) -> Option<OutputFormat> {
        match self {
            Self::Json => None,
            Self::Text => Some(OutputFormat::Text),
            Self::Markdown => Some(OutputFormat::Markdown),
            Self::Html => Some(OutputFormat::Html),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn all_flags_parse() {
        let cli = Cli::try_parse_from([
            "charsmith",
            "--race",
            "elf",
            "--class",
            "wizard",
            "--alignment",
            "neutral good",
            "--backstory",
            "brief",
            "--level",
            "3",
            "--format",
            "markdown",
            "--save",
            "--filename",
            "thalanil",
        ])
        .expect("parse");
        assert_eq!(cli.race.as_deref(), Some("elf"));
        assert_eq!(cli.alignment.as_deref(), Some("neutral good"));
        assert_eq!(cli.level, Some(3));
        assert_eq!(cli.format, DisplayFormat::Markdown);
        assert!(cli.save);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["charsmith"]).expect("parse");
        assert!(cli.race.is_none());
        assert_eq!(cli.format, DisplayFormat::Json);
        assert!(!cli.save);
    }

    #[test]
    fn load_conflicts_with_generation_flags() {
        let err = Cli::try_parse_from(["charsmith", "--load", "x.json", "--race", "Elf"])
            .expect_err("conflict");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["charsmith", "--format", "pdf"]).is_err());
    }

    #[test]
    fn json_has_no_sheet() {
        assert_eq!(DisplayFormat::Json.sheet(), None);
        assert_eq!(DisplayFormat::Html.sheet(), Some(OutputFormat::Html));
    }
}
