// Turn raw model output into a structured verdict.
//
// Text that opens with `{` must parse as one JSON object on its own. Any
// other text is searched for the greedy span from the first `{` to the last
// `}`. Field types are read leniently since models drift from the requested
// shape.

use std::sync::LazyLock;

use mediascreen_common::{Classification, Entity, Verdict};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static JSON_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("model output is JSON but not an object")]
    NotAnObject,

    #[error("invalid JSON in model output: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// The object the classification prompt asks for.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerdictResponse {
    #[serde(rename = "Summary", default, deserialize_with = "lenient_lines")]
    pub summary: Vec<String>,

    #[serde(rename = "IsNegative", default, deserialize_with = "lenient_bool")]
    pub is_negative: bool,

    #[serde(rename = "Reason", default, deserialize_with = "lenient_string")]
    pub reason: String,
}

impl VerdictResponse {
    pub fn into_verdict(self, entity: &Entity, link: &str) -> Verdict {
        Verdict {
            entity: entity.clone(),
            link: link.to_string(),
            summary: self.summary,
            classification: Classification::from_is_negative(self.is_negative),
            reason: self.reason,
        }
    }
}

/// Recover a verdict object from raw model text.
pub fn recover_verdict(raw: &str) -> Result<VerdictResponse, RecoveryError> {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') {
        return parse_direct(trimmed);
    }

    let span = extract_object_span(trimmed).ok_or(RecoveryError::NoJsonObject)?;
    parse_direct(span)
}

/// Parse `text` as exactly one JSON object.
pub fn parse_direct(text: &str) -> Result<VerdictResponse, RecoveryError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(RecoveryError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Greedy `{ ... }` span, first opening brace to last closing brace.
pub fn extract_object_span(text: &str) -> Option<&str> {
    JSON_SPAN_RE.find(text).map(|m| m.as_str())
}

// --- lenient field readers ---

/// Array of lines, a single newline-delimited string, or null.
fn lenient_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    })
}

/// `true`, `"true"` (any case) and non-zero numbers are negative. Anything
/// else, including `"false"`, is not.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
