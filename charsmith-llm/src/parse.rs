//! Typed parsing of model output.

use serde::de::DeserializeOwned;

use crate::error::LlmError;

/// Longest excerpt of the raw text quoted in a parse error.
const EXCERPT_CHARS: usize = 200;

/// Parse model output as JSON into `T`.
///
/// Surrounding whitespace and a single Markdown code fence (with or without
/// a `json` tag) are removed first; nothing else is repaired.
///
/// # Errors
/// Returns [`LlmError::EmptyResponse`] for blank text and
/// [`LlmError::ParseError`] when the text is not the expected JSON shape.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    serde_json::from_str(body).map_err(|e| {
        LlmError::ParseError(format!("{e} (response began: {:?})", excerpt(body)))
    })
}

/// Remove one enclosing ```` ``` ```` fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Language tag runs to the end of the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn plain_json() {
        let parsed: Named = parse_structured(r#"{"name": "Thalanil"}"#).expect("parse");
        assert_eq!(parsed.name, "Thalanil");
    }

    #[test]
    fn fenced_json_with_tag() {
        let text = "```json\n{\"name\": \"Brakka\"}\n```\n";
        let parsed: Named = parse_structured(text).expect("parse");
        assert_eq!(parsed.name, "Brakka");
    }

    #[test]
    fn fenced_json_without_tag() {
        let parsed: Vec<String> =
            parse_structured("```\n[\"Rope\", \"Torch\"]\n```").expect("parse");
        assert_eq!(parsed, vec!["Rope", "Torch"]);
    }

    #[test]
    fn prose_is_a_parse_error() {
        let err = parse_structured::<Value>("Sure! Here is your character: Thalanil")
            .expect_err("prose");
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let err = parse_structured::<Named>(r#"{"title": "x"}"#).expect_err("shape");
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn blank_is_empty_response() {
        assert!(matches!(
            parse_structured::<Value>("  \n"),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_structured::<Value>("```json\n```"),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn parse_error_quotes_a_bounded_excerpt() {
        let long = "x".repeat(5000);
        let err = parse_structured::<Value>(&long).expect_err("junk");
        assert!(err.to_string().len() < 600);
    }
}
