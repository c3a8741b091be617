//! Locates the flight fragment carrying the listing data and decodes its
//! string-literal escaping layer.
//!
//! The page embeds data as `self.__next_f.push([1,"…"])` fragments. Each body
//! is a JS string literal: one decode pass turns `\\` into `\`, `\"` into `"`
//! and expands `\uXXXX`. The payload inside is JSON-in-a-string, so the
//! decoded chunk still carries escaped quotes — that is the layer the block
//! extractor operates on.

use tracing::{debug, warn};

use crate::config::{CHUNK_PUSH_PREFIX, CHUNK_PUSH_SUFFIX, RECORD_MARKER};

/// Find the decoded chunk containing the record marker, or None when no
/// fragment qualifies. Iterates every fragment: the target is not guaranteed
/// to be the first push on the page.
pub fn locate_chunk(document: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(rel) = document[search_from..].find(CHUNK_PUSH_PREFIX) {
        let body_start = search_from + rel + CHUNK_PUSH_PREFIX.len();
        let Some(body_end) = find_fragment_end(document, body_start) else {
            // Unterminated fragment; nothing meaningful can follow.
            warn!("unterminated flight fragment at byte {body_start}");
            return None;
        };
        let raw = &document[body_start..body_end];
        search_from = body_end + CHUNK_PUSH_SUFFIX.len();

        match decode_string_literal(raw) {
            Some(chunk) if chunk.contains(RECORD_MARKER) => {
                debug!("qualifying chunk found ({} bytes decoded)", chunk.len());
                return Some(chunk);
            }
            Some(_) => continue,
            None => {
                warn!("flight fragment failed to decode, skipping");
                continue;
            }
        }
    }
    None
}

/// Find the closing `"])` of a fragment body starting at `from`. The closing
/// quote must not be escaped, i.e. it must be preceded by an even run of
/// backslashes.
fn find_fragment_end(document: &str, from: usize) -> Option<usize> {
    let bytes = document.as_bytes();
    let suffix = CHUNK_PUSH_SUFFIX.as_bytes();
    let mut i = from;
    while i + suffix.len() <= bytes.len() {
        if &bytes[i..i + suffix.len()] == suffix {
            let mut backslashes = 0;
            while i > backslashes && bytes[i - backslashes - 1] == b'\\' {
                backslashes += 1;
            }
            if backslashes % 2 == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Decode one level of string-literal escaping: `\\`, `\"`, `\/`, the
/// standard control escapes, and `\uXXXX` (with surrogate pairs). Returns
/// None on a malformed `\u` sequence or a dangling trailing backslash.
fn decode_string_literal(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'u' => out.push(decode_unicode_escape(&mut chars)?),
            // `\"`, `\\`, `\/` and any unknown escape: keep the char itself.
            other => out.push(other),
        }
    }
    Some(out)
}

fn decode_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let hi = read_hex4(chars)?;
    if (0xD800..0xDC00).contains(&hi) {
        // High surrogate: a `\uXXXX` low half must follow immediately.
        if chars.next()? != '\\' || chars.next()? != 'u' {
            return None;
        }
        let lo = read_hex4(chars)?;
        if !(0xDC00..0xE000).contains(&lo) {
            return None;
        }
        let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
        char::from_u32(code)
    } else {
        char::from_u32(hi)
    }
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!("<script>self.__next_f.push([1,\"{body}\"])</script>")
    }

    #[test]
    fn decodes_escapes_and_unicode() {
        let decoded = decode_string_literal(r#"a\"b\\c\u0026d\n"#).unwrap();
        assert_eq!(decoded, "a\"b\\c&d\n");
    }

    #[test]
    fn decodes_surrogate_pair() {
        let decoded = decode_string_literal("\\ud83c\\udfc6").unwrap();
        assert_eq!(decoded, "\u{1F3C6}");
    }

    #[test]
    fn rejects_truncated_unicode_escape() {
        assert!(decode_string_literal(r"\u00").is_none());
        assert!(decode_string_literal("dangling\\").is_none());
    }

    // Fragment body carrying the listing: at the page layer the embedded
    // JSON-in-a-string is double-escaped, so quotes appear as `\\\"`.
    const LISTING_BODY: &str = r#"listing:{\\\"competition\\\":{\\\"id\\\":\\\"1\\\"}}"#;

    #[test]
    fn finds_chunk_with_marker() {
        let doc = wrap(LISTING_BODY);
        let chunk = locate_chunk(&doc).unwrap();
        assert!(chunk.contains(r#"{\"competition\":"#));
    }

    #[test]
    fn skips_fragments_without_marker() {
        let doc = format!("{}{}", wrap(r#"nav:[\"header\"]"#), wrap(LISTING_BODY));
        let chunk = locate_chunk(&doc).unwrap();
        assert!(chunk.contains(r#"{\"competition\":"#));
    }

    #[test]
    fn skips_undecodable_fragment_and_keeps_scanning() {
        let doc = format!("{}{}", wrap(r"bad\u00ZZ"), wrap(LISTING_BODY));
        assert!(locate_chunk(&doc).is_some());
    }

    #[test]
    fn none_when_no_fragment_qualifies() {
        let doc = wrap("unrelated payload");
        assert!(locate_chunk(&doc).is_none());
    }

    #[test]
    fn none_on_document_without_fragments() {
        assert!(locate_chunk("<html><body>plain page</body></html>").is_none());
    }
}
