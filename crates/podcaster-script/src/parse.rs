//! Model-response sanitizing and parsing.
//!
//! Responses may carry scratchpad reasoning, markdown fences or prose
//! around the JSON payload. Sanitizing removes scratchpad regions, unwraps
//! fenced blocks and isolates the outermost brace span before parsing.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use podcaster_core::{Script, ScriptError};

static SCRATCHPAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<scratchpad>.*?</scratchpad>").expect("static regex is valid")
});

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static regex is valid")
});

/// Errors from response parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response has no JSON object at all.
    #[error("response contains no JSON object")]
    NoJson,

    /// The JSON failed to deserialize into the script shape.
    #[error("response JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The script parsed but violates a structural invariant.
    #[error("script is invalid: {0}")]
    Invalid(#[from] ScriptError),
}

/// Strip scratchpad regions and markdown fences, then isolate the span
/// between the first `{` and the last `}`.
#[must_use]
pub fn sanitize(raw: &str) -> Option<String> {
    let without_scratchpad = SCRATCHPAD.replace_all(raw, "");

    let unfenced = match FENCE.captures(&without_scratchpad) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
        None => without_scratchpad.into_owned(),
    };

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }
    Some(unfenced[start..=end].to_string())
}

/// Parse and validate a model response against the active roster.
pub fn parse_script(raw: &str, roster_names: &[&str]) -> Result<Script, ParseError> {
    let json = sanitize(raw).ok_or(ParseError::NoJson)?;
    let script: Script = serde_json::from_str(&json)?;
    script.validate(roster_names)?;
    Ok(script)
}
