//! Maps a parsed block into the canonical Competition record.

use serde_json::Value;
use tracing::debug;

use crate::types::Competition;

/// Build a Competition from a parsed block. The block must carry a
/// `competition` sub-object with non-empty `id` and `title`; otherwise the
/// candidate is dropped, not defaulted.
pub fn normalize(value: &Value) -> Option<Competition> {
    let comp = value.get("competition")?;

    let id = required_string(comp, "id")?;
    let title = required_string(comp, "title")?;

    Some(Competition {
        id,
        title,
        description: normalize_whitespace(optional_string(comp, "description")),
        prize: optional_string(comp, "prize").to_string(),
        time_left: optional_string(comp, "timeLeft").to_string(),
        source: optional_string(comp, "source").to_string(),
        participants: coerce_participants(comp.get("participants")),
        tags: coerce_tags(comp.get("tags")),
    })
}

fn required_string(comp: &Value, field: &str) -> Option<String> {
    let s = comp.get(field)?.as_str()?;
    if s.is_empty() {
        debug!("candidate dropped: empty {field}");
        return None;
    }
    Some(s.to_string())
}

fn optional_string<'a>(comp: &'a Value, field: &str) -> &'a str {
    comp.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Collapse whitespace runs to single spaces and trim.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Numbers pass through, numeric strings parse, anything else is 0.
fn coerce_participants(v: Option<&Value>) -> i64 {
    v.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })
    .unwrap_or(0)
}

/// Only a list shape yields tags, and only its string elements.
fn coerce_tags(v: Option<&Value>) -> Vec<String> {
    v.and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
