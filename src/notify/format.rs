//! Renders one Competition into a MarkdownV2 text block.

use crate::config::{DESCRIPTION_MAX_LEN, DESCRIPTION_TRUNCATE_AT};
use crate::types::Competition;

/// Characters Telegram's MarkdownV2 dialect reserves outside code entities.
const MARKDOWN_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Prefix every reserved character with a backslash.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if MARKDOWN_RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fixed multi-line block: linked title, labeled source/prize/deadline/tags
/// lines, truncated description. Empty fields render as an escaped dash.
pub fn render_block(c: &Competition, permalink_base: &str) -> String {
    let url = format!(
        "{}/competition/{}",
        permalink_base.trim_end_matches('/'),
        c.id
    );

    let tags = if c.tags.is_empty() {
        "\\-".to_string()
    } else {
        c.tags
            .iter()
            .map(|t| format!("`{t}`"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        "[{title}]({url})\n\
         Source: {source}\n\
         Prize: {prize}\n\
         Deadline: {deadline}\n\
         Tags: {tags}\n\
         {description}",
        title = escape_markdown(&c.title),
        source = text_or_dash(&c.source),
        prize = text_or_dash(&c.prize),
        deadline = text_or_dash(&c.time_left),
        description = text_or_dash(&truncate_description(&c.description)),
    )
}

fn text_or_dash(s: &str) -> String {
    if s.is_empty() {
        "\\-".to_string()
    } else {
        escape_markdown(s)
    }
}

/// Cut descriptions over DESCRIPTION_MAX_LEN chars to DESCRIPTION_TRUNCATE_AT
/// plus an ellipsis. Operates on the normalized text, before escaping.
fn truncate_description(s: &str) -> String {
    if s.chars().count() > DESCRIPTION_MAX_LEN {
        let cut: String = s.chars().take(DESCRIPTION_TRUNCATE_AT).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
