//! Packs rendered record blocks into size-capped messages with running
//! headers.
//!
//! Greedy left-to-right packing: a block joins the current batch unless the
//! batch's hypothetical length (header + blocks joined by blank lines) would
//! exceed the budget, in which case the batch is flushed first. Every record
//! lands in exactly one message, in original order; the header's total is
//! the same across all messages.

/// One outbound message plus how many records it carries (the run's notified
/// count advances by `record_count` per delivered message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub record_count: usize,
}

/// Header when a single message covers the whole run.
fn whole_header(total: usize) -> String {
    if total == 1 {
        "*🏆 1 new competition*".to_string()
    } else {
        format!("*🏆 {total} new competitions*")
    }
}

/// Header for a sub-range, 1-based inclusive positions.
fn range_header(start: usize, end: usize, total: usize) -> String {
    format!("*🏆 New competitions {start}\\-{end} of {total}*")
}

fn header_for(start: usize, end: usize, total: usize) -> String {
    if start == 1 && end == total {
        whole_header(total)
    } else {
        range_header(start, end, total)
    }
}

const SEPARATOR: &str = "\n\n";

pub fn build_messages(blocks: &[String], max_len: usize) -> Vec<OutboundMessage> {
    let total = blocks.len();
    let mut messages: Vec<OutboundMessage> = Vec::new();
    if total == 0 {
        return messages;
    }

    let mut batch: Vec<&str> = Vec::new();
    let mut batch_start = 1; // 1-based position of the batch's first record

    for (i, block) in blocks.iter().enumerate() {
        let pos = i + 1;
        // Length the batch would have with this block appended, under the
        // header its range would then carry.
        let header = header_for(batch_start, pos, total);
        let hypothetical = header.chars().count()
            + SEPARATOR.len()
            + batch.iter().map(|b| b.chars().count()).sum::<usize>()
            + SEPARATOR.len() * batch.len()
            + block.chars().count();

        if hypothetical > max_len && !batch.is_empty() {
            let end = batch_start + batch.len() - 1;
            messages.push(flush(&batch, &range_header(batch_start, end, total)));
            batch_start = pos;
            batch.clear();
        }
        batch.push(block);
    }

    let header = if messages.is_empty() {
        whole_header(total)
    } else {
        range_header(batch_start, total, total)
    };
    messages.push(flush(&batch, &header));
    messages
}

fn flush(batch: &[&str], header: &str) -> OutboundMessage {
    OutboundMessage {
        text: format!("{header}{SEPARATOR}{}", batch.join(SEPARATOR)),
        record_count: batch.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(lens: &[usize]) -> Vec<String> {
        lens.iter()
            .enumerate()
            .map(|(i, &n)| {
                let tag = format!("B{i}:");
                let fill = "x".repeat(n.saturating_sub(tag.len()));
                format!("{tag}{fill}")
            })
            .collect()
    }

    #[test]
    fn everything_fits_in_one_message_with_whole_header() {
        let msgs = build_messages(&blocks(&[40, 40]), 200);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].text.starts_with("*🏆 2 new competitions*\n\n"));
        assert_eq!(msgs[0].record_count, 2);
    }

    #[test]
    fn single_record_uses_singular_header() {
        let msgs = build_messages(&blocks(&[40]), 200);
        assert_eq!(msgs[0].text.lines().next().unwrap(), "*🏆 1 new competition*");
    }

    #[test]
    fn overflow_splits_into_range_headed_messages() {
        // Three 40-char blocks against a 120-char budget: the header plus two
        // blocks fits, the third would push past 120.
        let msgs = build_messages(&blocks(&[40, 40, 40]), 120);
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].text.starts_with("*🏆 New competitions 1\\-2 of 3*"));
        assert!(msgs[1].text.starts_with("*🏆 New competitions 3\\-3 of 3*"));
        assert_eq!(msgs[0].record_count, 2);
        assert_eq!(msgs[1].record_count, 1);
        for m in &msgs {
            assert!(m.text.chars().count() <= 120, "message over budget");
        }
    }

    #[test]
    fn blocks_reassemble_in_original_order() {
        let original = blocks(&[40, 40, 40, 40, 40]);
        let msgs = build_messages(&original, 120);
        let mut recovered = Vec::new();
        for m in &msgs {
            // Strip the header line and its trailing blank line.
            let body = m.text.splitn(2, "\n\n").nth(1).unwrap();
            for block in body.split("\n\n") {
                recovered.push(block.to_string());
            }
        }
        assert_eq!(recovered, original);
        assert_eq!(
            msgs.iter().map(|m| m.record_count).sum::<usize>(),
            original.len()
        );
    }

    #[test]
    fn header_total_consistent_across_messages() {
        let msgs = build_messages(&blocks(&[40, 40, 40, 40]), 100);
        assert!(msgs.len() > 1);
        for m in &msgs {
            assert!(m.text.lines().next().unwrap().contains("of 4"));
        }
    }

    #[test]
    fn oversized_single_block_still_emitted() {
        let msgs = build_messages(&blocks(&[500]), 100);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].record_count, 1);
    }

    #[test]
    fn no_records_no_messages() {
        assert!(build_messages(&[], 100).is_empty());
    }
}
