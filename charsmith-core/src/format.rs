//! Human-readable renderings of a character record.

use std::fmt::Write as _;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{CharsmithError, Result};
use crate::record::{Character, is_blank};
use crate::stats::modifier;

/// Display format for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Text,
    /// Markdown.
    Markdown,
    /// An HTML fragment.
    Html,
}

impl FromStr for OutputFormat {
    type Err = CharsmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(CharsmithError::validation(
                "format",
                format!("Unknown format '{other}'. Must be one of: text, markdown, html"),
            )),
        }
    }
}

/// Render `character` for display.
///
/// The record is validated first; the renderings never truncate.
///
/// # Errors
/// Returns [`CharsmithError::Validation`] if the record is invalid.
pub fn render(character: &Character, format: OutputFormat) -> Result<String> {
    character.validate()?;
    Ok(match format {
        OutputFormat::Text => render_text(character),
        OutputFormat::Markdown => render_markdown(character),
        OutputFormat::Html => render_html(character),
    })
}

fn signed(value: i16) -> String {
    format!("{value:+}")
}

fn render_text(c: &Character) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Character Name: {}", c.name);
    let _ = writeln!(out, "Race: {}", c.race);
    let _ = writeln!(out, "Class: {} (level {})", c.class, c.level);
    let _ = writeln!(out, "Alignment: {}", c.alignment);
    out.push_str("\nStats:\n");
    for (ability, score) in c.stats.iter() {
        let _ = writeln!(out, "{}: {} ({})", ability.label(), score, signed(modifier(score)));
    }
    let _ = write!(out, "\nBackground:\n{}\n", c.background);
    if !c.equipment.is_empty() {
        out.push_str("\nEquipment:\n");
        for item in &c.equipment {
            let _ = writeln!(out, "- {item}");
        }
    }
    for (title, block) in extra_blocks(c) {
        let _ = write!(out, "\n{title}:\n{}\n", block_text(block));
    }
    out
}

fn render_markdown(c: &Character) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", c.name);
    out.push_str("## Basic Information\n");
    let _ = writeln!(out, "- **Race:** {}", c.race);
    let _ = writeln!(out, "- **Class:** {}", c.class);
    let _ = writeln!(out, "- **Level:** {}", c.level);
    let _ = writeln!(out, "- **Alignment:** {}", c.alignment);
    out.push_str("\n## Stats\n");
    for (ability, score) in c.stats.iter() {
        let _ = writeln!(
            out,
            "- **{}:** {} ({})",
            ability.label(),
            score,
            signed(modifier(score))
        );
    }
    let _ = write!(out, "\n## Background\n{}\n", c.background);
    if !c.equipment.is_empty() {
        out.push_str("\n## Equipment\n");
        for item in &c.equipment {
            let _ = writeln!(out, "- {item}");
        }
    }
    for (title, block) in extra_blocks(c) {
        let _ = write!(out, "\n## {title}\n```json\n{}\n```\n", block_text(block));
    }
    out
}

fn render_html(c: &Character) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<h1>{}</h1>", escape_html(&c.name));
    out.push_str("<h2>Basic Information</h2>\n<ul>\n");
    let _ = writeln!(out, "    <li><strong>Race:</strong> {}</li>", c.race);
    let _ = writeln!(out, "    <li><strong>Class:</strong> {}</li>", c.class);
    let _ = writeln!(out, "    <li><strong>Level:</strong> {}</li>", c.level);
    let _ = writeln!(out, "    <li><strong>Alignment:</strong> {}</li>", c.alignment);
    out.push_str("</ul>\n<h2>Stats</h2>\n<ul>\n");
    for (ability, score) in c.stats.iter() {
        let _ = writeln!(
            out,
            "    <li><strong>{}:</strong> {} ({})</li>",
            ability.label(),
            score,
            signed(modifier(score))
        );
    }
    out.push_str("</ul>\n<h2>Background</h2>\n");
    let _ = writeln!(out, "<p>{}</p>", escape_html(&c.background));
    if !c.equipment.is_empty() {
        out.push_str("<h2>Equipment</h2>\n<ul>\n");
        for item in &c.equipment {
            let _ = writeln!(out, "    <li>{}</li>", escape_html(item));
        }
        out.push_str("</ul>\n");
    }
    for (title, block) in extra_blocks(c) {
        let _ = writeln!(
            out,
            "<h2>{title}</h2>\n<pre>{}</pre>",
            escape_html(&block_text(block))
        );
    }
    out
}

/// Features and spells, skipping empty blocks.
fn extra_blocks(c: &Character) -> Vec<(&'static str, &Value)> {
    let mut blocks = Vec::new();
    if !is_blank(&c.features) {
        blocks.push(("Features", &c.features));
    }
    if let Some(spells) = c.spells.as_ref().filter(|s| !is_blank(s)) {
        blocks.push(("Spells", spells));
    }
    blocks
}

fn block_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Alignment, CharacterClass, Race};
    use crate::stats::AbilityScores;
    use serde_json::json;

    fn sample() -> Character {
        Character {
            name: "Thalanil Moonweaver".into(),
            race: Race::Elf,
            class: CharacterClass::Wizard,
            alignment: Alignment::NeutralGood,
            level: 3,
            stats: AbilityScores::new(8, 14, 12, 16, 13, 10),
            background: "Apprenticed to a <reclusive> archmage & never looked back.".into(),
            equipment: vec!["Spellbook".into(), "Quarterstaff".into()],
            features: json!({ "racial": ["Darkvision", "Fey Ancestry"] }),
            spells: Some(json!({ "cantrips": ["Fire Bolt"], "level_1": ["Magic Missile"] })),
        }
    }

    #[test]
    fn text_layout() {
        let text = render(&sample(), OutputFormat::Text).expect("render");
        assert!(text.starts_with("Character Name: Thalanil Moonweaver\nRace: Elf\n"));
        assert!(text.contains("Alignment: Neutral Good\n"));
        assert!(text.contains("\nStats:\nStrength: 8 (-1)\nDexterity: 14 (+2)\n"));
        assert!(text.contains("Intelligence: 16 (+3)\n"));
        assert!(text.contains("Background:\nApprenticed to a <reclusive> archmage"));
        assert!(text.contains("- Quarterstaff\n"));
        assert!(text.contains("Magic Missile"));
    }

    #[test]
    fn markdown_layout() {
        let md = render(&sample(), OutputFormat::Markdown).expect("render");
        assert!(md.starts_with("# Thalanil Moonweaver\n## Basic Information\n"));
        assert!(md.contains("- **Race:** Elf\n"));
        assert!(md.contains("- **Charisma:** 10 (+0)\n"));
        assert!(md.contains("## Background\n"));
        assert!(md.contains("## Spells\n```json\n"));
    }

    #[test]
    fn html_escapes_free_text() {
        let html = render(&sample(), OutputFormat::Html).expect("render");
        assert!(html.starts_with("<h1>Thalanil Moonweaver</h1>\n"));
        assert!(html.contains("&lt;reclusive&gt; archmage &amp; never"));
        assert!(html.contains("<li><strong>Wisdom:</strong> 13 (+1)</li>"));
        assert!(!html.contains("<reclusive>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let c = sample();
        for format in [OutputFormat::Text, OutputFormat::Markdown, OutputFormat::Html] {
            assert_eq!(
                render(&c, format).expect("first"),
                render(&c, format).expect("second")
            );
        }
    }

    #[test]
    fn long_background_is_not_truncated() {
        let mut c = sample();
        c.background = "word ".repeat(5000);
        let text = render(&c, OutputFormat::Text).expect("render");
        assert!(text.contains(c.background.as_str()));
    }

    #[test]
    fn invalid_record_is_rejected() {
        let mut c = sample();
        c.level = 0;
        assert!(matches!(
            render(&c, OutputFormat::Markdown),
            Err(CharsmithError::Validation { .. })
        ));
    }

    #[test]
    fn fighter_has_no_spells_section() {
        let mut c = sample();
        c.class = CharacterClass::Fighter;
        c.spells = None;
        let text = render(&c, OutputFormat::Text).expect("render");
        assert!(!text.contains("Spells:"));
    }

    #[test]
    fn format_parsing() {
        assert_eq!("Markdown".parse::<OutputFormat>().expect("md"), OutputFormat::Markdown);
        assert_eq!(" html ".parse::<OutputFormat>().expect("html"), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
