//! Deduplication gate: partitions extracted records into new vs. seen.

use futures_util::future::try_join_all;
use tracing::warn;

use crate::error::Result;
use crate::store::SeenStore;
use crate::types::Competition;

/// Return the subset of `records` with no existing seen marker, preserving
/// order. All lookups run concurrently and are joined before partitioning;
/// a failed lookup aborts the run (the store is assumed reliable once open).
///
/// Fail-open: with no store configured every record is treated as new.
/// Deliberate policy — transient infra absence must not suppress all
/// notifications forever, at the cost of possible duplicates.
pub async fn filter_new<S: SeenStore>(
    store: Option<&S>,
    records: Vec<Competition>,
) -> Result<Vec<Competition>> {
    let Some(store) = store else {
        if !records.is_empty() {
            warn!(
                "seen store not configured, treating all {} records as new",
                records.len()
            );
        }
        return Ok(records);
    };

    let seen = try_join_all(records.iter().map(|r| store.contains(&r.id))).await?;

    Ok(records
        .into_iter()
        .zip(seen)
        .filter(|(_, seen)| !seen)
        .map(|(r, _)| r)
        .collect())
}

/// Persist a seen marker for every record, concurrently, joined. Callers must
/// invoke this before the notification attempt: a crash between persistence
/// and delivery loses a notification instead of duplicating one next run.
pub async fn mark_seen<S: SeenStore>(store: Option<&S>, records: &[Competition]) -> Result<()> {
    let Some(store) = store else {
        return Ok(());
    };
    try_join_all(records.iter().map(|r| store.mark(&r.id))).await?;
    Ok(())
}
