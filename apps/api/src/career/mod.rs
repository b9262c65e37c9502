//! Downstream aggregation: consumers of the finalized course-record list.
//!
//! Orchestration only — each service here is one prompt, one model call,
//! and one defensive decode. All of them tolerate empty course lists and
//! missing grade/credits, and degrade to a well-formed empty shape when
//! the model output cannot be used.

pub mod analyze;
pub mod companies;
pub mod handlers;
pub mod persistence;
pub mod profile;
pub mod prompts;

/// Outermost `{ ... }` object in a model response, tolerating prose around it.
pub(crate) fn outer_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Coerces a JSON array value to its non-empty string elements.
pub(crate) fn string_vec(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
