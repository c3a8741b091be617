//! Extraction pipeline: locate + decode the embedded chunk, carve out
//! balanced JSON blocks, tolerant-parse each one, normalize to Competition.

pub mod blocks;
pub mod chunk;
pub mod decode;
pub mod normalize;

use tracing::{error, info};

use crate::config::RECORD_MARKER;
use crate::types::Competition;

/// Run the full extraction pipeline over a fetched document.
///
/// Both failure shapes yield an empty list but log distinct critical
/// conditions: no qualifying chunk (site structure changed) vs. a chunk with
/// zero extractable records (extractor regression).
pub fn extract_competitions(document: &str) -> Vec<Competition> {
    let Some(chunk) = chunk::locate_chunk(document) else {
        error!("no qualifying data chunk found in document; page structure may have changed");
        return Vec::new();
    };

    let raw_blocks = blocks::extract_blocks(&chunk, RECORD_MARKER);
    let records: Vec<Competition> = raw_blocks
        .iter()
        .filter_map(|b| decode::parse_block(b))
        .filter_map(|v| normalize::normalize(&v))
        .collect();

    if records.is_empty() {
        error!(
            "qualifying chunk found but zero records extracted ({} raw blocks)",
            raw_blocks.len()
        );
    } else {
        info!("extracted {} records from {} blocks", records.len(), raw_blocks.len());
    }
    records
}
