//! Recover a JSON object from free-form model output.
//!
//! Models are asked for a bare JSON object but routinely wrap it in code
//! fences or chatty prose. Extraction runs an ordered list of pure
//! strategies and stops at the first one that yields an object.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// A JSON object as produced by the model.
pub type JsonObject = Map<String, Value>;

/// One extraction attempt over the raw text.
pub type Strategy = fn(&str) -> Option<JsonObject>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct", parse_direct),
    ("strip_fences", parse_without_fences),
    ("brace_slice", parse_brace_slice),
];

/// Return the first JSON object any strategy recovers, or `None` if the
/// text holds no structured result.
pub fn extract_object(raw: &str) -> Option<JsonObject> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(raw);
        if found.is_some() {
            tracing::debug!(strategy = name, "structured result recovered");
        }
        found
    })
}

fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Parse the trimmed text as-is.
pub fn parse_direct(raw: &str) -> Option<JsonObject> {
    parse_object(raw)
}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?i)```(?:json)?").ok())
        .as_ref()
}

/// Remove ```` ```json ````, ```` ```JSON ```` and bare ```` ``` ```` markers, then parse.
pub fn parse_without_fences(raw: &str) -> Option<JsonObject> {
    let stripped = match fence_pattern() {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.replace("```json", "").replace("```", ""),
    };
    parse_object(&stripped)
}

/// Parse the slice from the first `{` to the last `}` inclusive.
pub fn parse_brace_slice(raw: &str) -> Option<JsonObject> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&raw[start..=end])
}
