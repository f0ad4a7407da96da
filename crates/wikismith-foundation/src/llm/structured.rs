//! Structured-output decode boundary
//!
//! Models asked for JSON routinely return *almost*-JSON: fenced in
//! markdown, wrapped in prose, or with trailing commas. All structured
//! output flows through this single boundary: repair, then parse, then
//! shape-validate. The two failure kinds are distinct so callers can tell
//! "not JSON at all" from "valid JSON of the wrong shape".

use serde::de::DeserializeOwned;
use wikismith_kernel::{PipelineError, StructuredPayload};

use super::types::LLMError;

/// Structured-output decode failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// The text is not valid JSON even after repair.
    #[error("invalid JSON for {shape}: {message}; content starts: {snippet}")]
    Parse {
        shape: &'static str,
        message: String,
        snippet: String,
    },
    /// The text is valid JSON but does not match the expected shape.
    #[error("JSON does not match shape {shape}: {message}")]
    Shape {
        shape: &'static str,
        message: String,
    },
}

impl From<DecodeError> for LLMError {
    fn from(err: DecodeError) -> Self {
        LLMError::SerializationError(err.to_string())
    }
}

impl From<DecodeError> for PipelineError {
    fn from(err: DecodeError) -> Self {
        PipelineError::Decode(err.to_string())
    }
}

/// Best-effort repair of near-valid JSON text.
///
/// Applied before parsing, in order:
/// 1. strip markdown code fences (```json ... ``` or plain ```)
/// 2. slice from the first `{`/`[` to the matching last `}`/`]`,
///    dropping surrounding prose
/// 3. remove trailing commas before closing braces/brackets
///
/// The result is not guaranteed to parse; callers must still treat parse
/// failure as a hard error.
pub fn repair_json(raw: &str) -> String {
    let stripped = strip_code_fences(raw.trim());
    let sliced = slice_outer_value(stripped);
    strip_trailing_commas(sliced)
}

/// Decode a model response into a structured payload.
///
/// Runs the repair pass, parses to a JSON value, then deserializes into
/// `T`, reporting [`DecodeError::Parse`] and [`DecodeError::Shape`]
/// respectively.
pub fn decode<T>(raw: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned + StructuredPayload,
{
    let repaired = repair_json(raw);

    let value: serde_json::Value =
        serde_json::from_str(&repaired).map_err(|e| DecodeError::Parse {
            shape: T::shape_name(),
            message: e.to_string(),
            snippet: repaired.chars().take(120).collect(),
        })?;

    serde_json::from_value(value).map_err(|e| DecodeError::Shape {
        shape: T::shape_name(),
        message: e.to_string(),
    })
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            if let Some(inner) = rest.strip_suffix("```") {
                return inner.trim();
            }
            return rest.trim();
        }
    }
    trimmed
}

/// Slice out the outermost JSON value, dropping prose around it.
fn slice_outer_value(text: &str) -> &str {
    let open = text.find(['{', '[']);
    let Some(start) = open else {
        return text;
    };
    let closer = if text.as_bytes()[start] == b'{' {
        '}'
    } else {
        ']'
    };
    match text.rfind(closer) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

/// Remove trailing commas before `}` / `]`, string-aware.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a comma that directly precedes the closer.
                while out
                    .trim_end_matches(|ch: char| ch.is_whitespace())
                    .ends_with(',')
                {
                    let len = out.trim_end().len();
                    out.truncate(len - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
