//! Tolerant parse of one raw block into a JSON value.
//!
//! A raw block still carries escaped quotes (`\"key\":\"value\"`) and may
//! contain literal control characters that are illegal inside JSON string
//! literals. Two attempts are made, kept distinct so a failure is
//! attributable to a specific layer: the plain sanitize-unescape-parse pass,
//! then a byte-reinterpretation fallback for payloads whose UTF-8 was
//! mangled upstream.

use serde_json::Value;
use tracing::warn;

/// Parse one raw block. None means both attempts failed and the block is
/// discarded; this never affects other blocks.
pub fn parse_block(raw: &str) -> Option<Value> {
    let sanitized = sanitize_control_chars(raw);

    match parse_unescaped(&sanitized) {
        Ok(v) => return Some(v),
        Err(e) => warn!("block parse failed, retrying with byte reinterpretation: {e}"),
    }

    let reinterpreted = reinterpret_utf8(&sanitized);
    match parse_unescaped(&reinterpreted) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("block discarded after reinterpretation retry: {e}");
            None
        }
    }
}

/// Undo the quote escaping and parse as JSON.
fn parse_unescaped(s: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&s.replace("\\\"", "\""))
}

/// Replace control characters that have a standard JSON escape with that
/// escape sequence, and drop the rest of the 0x00–0x1F range outright.
fn sanitize_control_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

/// Reinterpret the string's chars as raw bytes and re-decode as UTF-8,
/// replacing invalid sequences. Recovers payloads that were decoded as
/// Latin-1 upstream while actually holding UTF-8 bytes.
fn reinterpret_utf8(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .filter(|&c| (c as u32) < 0x100)
        .map(|c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
