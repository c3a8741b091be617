//! Carves balanced JSON objects out of the once-decoded chunk.
//!
//! The chunk is not itself JSON — records sit inline in a larger flight
//! payload, still carrying one level of quote escaping. A hand-rolled
//! brace-depth scan with a string-aware toggle substitutes for a real parser:
//! two states (in-string / not-in-string) plus a depth counter, one
//! left-to-right pass per occurrence.

use tracing::warn;

/// One raw object substring per marker occurrence, in chunk order.
/// A per-occurrence extraction failure skips that occurrence only; the scan
/// continues with the next marker.
pub fn extract_blocks(chunk: &str, marker: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = chunk[cursor..].find(marker) {
        let marker_at = cursor + rel;
        // Object start: first `{` at or after the marker. None means the
        // chunk tail is malformed and nothing further can be extracted.
        let Some(start_rel) = chunk[marker_at..].find('{') else {
            warn!("no object start after marker at byte {marker_at}, stopping scan");
            break;
        };
        let start = marker_at + start_rel;

        match scan_balanced(chunk.as_bytes(), start) {
            Some(end) => {
                blocks.push(chunk[start..=end].to_string());
                cursor = end + 1;
            }
            None => {
                warn!("unbalanced object at byte {start}, skipping occurrence");
                cursor = start + 1;
            }
        }
    }

    blocks
}

/// Scan from the `{` at `start` to the `}` that returns brace depth to zero.
/// A quote is escaped iff immediately preceded by a backslash; braces inside
/// a string literal do not affect depth. Returns None when depth never
/// returns to zero before the chunk ends.
fn scan_balanced(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string = false;

    for i in start..bytes.len() {
        let escaped = i > 0 && bytes[i - 1] == b'\\';
        match bytes[i] {
            b'"' if !escaped => in_string = !in_string,
            b'{' if !in_string && !escaped => depth += 1,
            b'}' if !in_string && !escaped => {
                depth -= 1;
                if depth <= 0 {
                    // depth < 0 means the starting brace never counted
                    // (escaped); treat as unbalanced.
                    return (depth == 0).then_some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RECORD_MARKER;

    #[test]
    fn extracts_one_block_per_marker() {
        let chunk = format!(
            r#"prefix {m}{{\"id\":\"a\"}}}} mid {m}{{\"id\":\"b\"}}}} tail"#,
            m = RECORD_MARKER,
        );
        let blocks = extract_blocks(&chunk, RECORD_MARKER);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains(r#"\"id\":\"a\""#));
        assert!(blocks[1].contains(r#"\"id\":\"b\""#));
    }

    #[test]
    fn block_spans_nested_objects() {
        let chunk = format!(r#"{m}{{\"meta\":{{\"x\":1}}}}}}"#, m = RECORD_MARKER);
        let blocks = extract_blocks(&chunk, RECORD_MARKER);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].ends_with("}}"));
        assert!(blocks[0].starts_with('{'));
    }

    #[test]
    fn unbalanced_occurrence_is_skipped_not_fatal() {
        // First occurrence never closes; second is well-formed. The second
        // marker sits inside the unbalanced span, which is exactly where the
        // cursor-advance recovery matters.
        let chunk = format!(
            r#"{m}{{\"id\":\"broken\" {m}{{\"id\":\"ok\"}}}}"#,
            m = RECORD_MARKER,
        );
        let blocks = extract_blocks(&chunk, RECORD_MARKER);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains(r#"\"id\":\"ok\""#));
    }

    #[test]
    fn scan_stops_when_no_object_start_follows() {
        let chunk = format!("text {m}", m = "MARK");
        assert!(extract_blocks(&chunk, "MARK").is_empty());
    }

    #[test]
    fn unescaped_quotes_guard_braces_in_strings() {
        // At this layer an unescaped quote toggles the in-string flag, so the
        // brace between the quotes must not close the object early.
        let chunk = r#"MARK{"note":"has } brace","k":2}"#;
        let blocks = extract_blocks(chunk, "MARK");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], r#"{"note":"has } brace","k":2}"#);
    }

    #[test]
    fn empty_chunk_yields_no_blocks() {
        assert!(extract_blocks("", RECORD_MARKER).is_empty());
    }
}
