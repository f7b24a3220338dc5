//! Cascade of strategies for pulling one JSON value out of model output.
//!
//! Strategies run in a fixed order and the first that parses wins:
//!
//! 1. the whole text
//! 2. each fenced code block tagged `json` or untagged
//! 3. the span from the first `{` to the last `}`
//! 4. the span from the first `[` to the last `]`
//! 5. the whole text with control characters removed
//!
//! Fenced blocks come before brace scanning so stray braces in surrounding
//! prose cannot widen the scanned span.
//!
//! ```rust
//! use rextract::extract_json;
//!
//! let value = extract_json("Sure! ```json\n{\"a\":1}\n``` Anything else?")
//!     .expect("fenced block should parse");
//! assert_eq!(value["a"], 1);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ExtractError;

const FENCE: &str = "```";

pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    if let Some(value) = parse(text) {
        return Ok(value);
    }

    if let Some(value) = fenced_blocks(text).into_iter().find_map(parse) {
        return Ok(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(value) = delimited_span(text, open, close).and_then(parse) {
            return Ok(value);
        }
    }

    let cleaned = strip_control_chars(text);
    parse(&cleaned).ok_or_else(|| {
        ExtractError::no_parseable_json("Could not parse valid JSON from the AI response.")
    })
}

/// Extracts JSON and deserializes it into `T`.
pub fn extract_as<T>(text: &str) -> Result<T, ExtractError>
where
    T: DeserializeOwned,
{
    let value = extract_json(text)?;
    serde_json::from_value(value)
        .map_err(|err| ExtractError::invalid_shape(format!("unexpected JSON shape: {err}")))
}

/// Removes ```` ``` ````, ```` ```js ```` and ```` ```javascript ```` markers and trims the rest.
pub fn strip_code_fences(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find(FENCE) {
        output.push_str(&rest[..index]);
        let after = &rest[index + FENCE.len()..];
        rest = after
            .strip_prefix("javascript")
            .or_else(|| after.strip_prefix("js"))
            .unwrap_or(after);
    }
    output.push_str(rest);
    output.trim().to_string()
}

fn parse(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok()
}

fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        let inner = &after_open[..close];
        rest = &after_open[close + FENCE.len()..];

        let (tag, body) = match inner.split_once('\n') {
            Some((tag, body)) => (tag.trim(), body),
            None => match inner.trim_start().strip_prefix("json") {
                Some(body) => ("json", body),
                None => ("", inner),
            },
        };
        if tag.is_empty() || tag.eq_ignore_ascii_case("json") {
            blocks.push(body.trim());
        }
    }
    blocks
}

fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(*ch, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}'))
        .collect()
}
