use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Canonical record extracted from the listing payload.
///
/// Only constructed when both `id` and `title` are present and non-empty in
/// the decoded payload; every other field defaults when absent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    pub id: String,
    pub title: String,
    /// Whitespace-normalized free text; may be empty.
    pub description: String,
    pub prize: String,
    pub time_left: String,
    pub source: String,
    pub participants: i64,
    pub tags: Vec<String>,
}

/// Per-run summary returned by the trigger endpoint and logged by the scheduler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    /// Records extracted from the page.
    pub fetched: usize,
    /// Records with no existing seen marker.
    pub new_items: usize,
    /// Records carried by successfully delivered messages.
    pub notified: usize,
    pub completed_at: String,
}

pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Format Unix seconds as an ISO 8601 UTC timestamp (civil-from-days math,
/// proleptic Gregorian).
pub fn unix_to_iso(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hour, minute, second) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch_formats_as_iso() {
        assert_eq!(unix_to_iso(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn known_timestamp_formats_correctly() {
        // 2024-03-01 12:30:45 UTC
        assert_eq!(unix_to_iso(1_709_296_245), "2024-03-01T12:30:45Z");
    }

    #[test]
    fn leap_day_handled() {
        // 2024-02-29 00:00:00 UTC
        assert_eq!(unix_to_iso(1_709_164_800), "2024-02-29T00:00:00Z");
    }

    #[test]
    fn workflow_result_serializes_camel_case() {
        let r = WorkflowResult {
            fetched: 3,
            new_items: 2,
            notified: 1,
            completed_at: "2024-03-01T12:30:45Z".to_string(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["fetched"], 3);
        assert_eq!(json["newItems"], 2);
        assert_eq!(json["notified"], 1);
        assert_eq!(json["completedAt"], "2024-03-01T12:30:45Z");
    }
}
