//! Map an extracted JSON object onto the canonical explanation and tags.
//!
//! Key aliases are resolved here and nowhere else.

use serde_json::Value;

use crate::domain::{StageError, TagList};
use crate::extract::JsonObject;

/// Keys accepted for the explanation, in priority order.
pub const EXPLANATION_KEYS: &[&str] = &["explanation", "description", "summary"];

/// Keys accepted for the tags, in priority order.
pub const TAG_KEYS: &[&str] = &["tags", "categories"];

/// Canonical fields recovered from a model object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub explanation: Option<String>,
    pub tags: Option<TagList>,
    /// Fields that were present but had an unusable shape.
    pub issues: Vec<StageError>,
}

impl Normalized {
    /// True when neither field survived normalization.
    pub fn is_empty(&self) -> bool {
        self.explanation.is_none() && self.tags.is_none()
    }
}

enum Field<T> {
    Absent,
    Value(T),
    Unusable,
}

/// Normalize an extracted object. Tags are capped at `max_tags_len` characters.
pub fn normalize(object: &JsonObject, max_tags_len: usize) -> Normalized {
    let mut out = Normalized::default();

    match first_present(object, EXPLANATION_KEYS).map_or(Field::Absent, explanation_field) {
        Field::Value(text) => out.explanation = Some(text),
        Field::Unusable => out.issues.push(StageError::NormalizationIncomplete {
            field: "explanation",
        }),
        Field::Absent => {}
    }

    match first_present(object, TAG_KEYS).map_or(Field::Absent, tags_field) {
        Field::Value(joined) => out.tags = TagList::new(&joined, max_tags_len),
        Field::Unusable => out
            .issues
            .push(StageError::NormalizationIncomplete { field: "tags" }),
        Field::Absent => {}
    }

    out
}

fn first_present<'a>(object: &'a JsonObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Scalar to trimmed text. `None` for nested values.
fn scalar_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => {
            let s = s.trim();
            Some((!s.is_empty()).then(|| s.to_string()))
        }
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn explanation_field(value: &Value) -> Field<String> {
    match scalar_text(value) {
        Some(Some(text)) => Field::Value(text),
        Some(None) => Field::Absent,
        None => Field::Unusable,
    }
}

fn tags_field(value: &Value) -> Field<String> {
    match value {
        Value::Array(items) => {
            let mut labels = Vec::with_capacity(items.len());
            for item in items {
                match scalar_text(item) {
                    Some(Some(label)) => labels.push(label),
                    Some(None) => {}
                    None => return Field::Unusable,
                }
            }
            if labels.is_empty() {
                Field::Absent
            } else {
                Field::Value(labels.join(", "))
            }
        }
        other => explanation_field(other),
    }
}
