//! Orchestrates one run: fetch → extract → dedupe → persist markers → notify.

use tracing::{info, warn};

use crate::config::{Config, MAX_MESSAGE_LEN};
use crate::dedup;
use crate::extract::extract_competitions;
use crate::fetcher::fetch_listing;
use crate::notify::{build_messages, render_block, TelegramNotifier};
use crate::store::SeenStore;
use crate::types::{now_unix_secs, unix_to_iso, WorkflowResult};
use crate::error::Result;

/// Execute one workflow run. Only the fetch is fatal; every later condition
/// is absorbed into the counts.
pub async fn run_workflow<S: SeenStore>(
    cfg: &Config,
    store: Option<&S>,
    notifier: Option<&TelegramNotifier>,
) -> Result<WorkflowResult> {
    let document = fetch_listing(cfg).await?;
    process_document(cfg, &document, store, notifier).await
}

/// Everything after the fetch, separated so the pipeline is exercisable
/// without a network.
pub async fn process_document<S: SeenStore>(
    cfg: &Config,
    document: &str,
    store: Option<&S>,
    notifier: Option<&TelegramNotifier>,
) -> Result<WorkflowResult> {
    let records = extract_competitions(document);
    let fetched = records.len();

    let new = dedup::filter_new(store, records).await?;
    let new_items = new.len();
    info!("{fetched} records extracted, {new_items} new");

    let mut notified = 0;
    if !new.is_empty() {
        // Markers land before the notification attempt: a crash in between
        // loses notifications rather than duplicating them next run.
        dedup::mark_seen(store, &new).await?;

        match notifier {
            Some(notifier) => {
                let blocks: Vec<String> = new
                    .iter()
                    .map(|c| render_block(c, &cfg.permalink_base_url))
                    .collect();
                let messages = build_messages(&blocks, MAX_MESSAGE_LEN);
                notified = notifier.send_all(&messages).await;
            }
            None => info!("notifier not configured, skipping {new_items} notifications"),
        }
    }

    if let Some(store) = store {
        match store.purge_expired().await {
            Ok(0) => {}
            Ok(n) => info!("purged {n} expired seen markers"),
            Err(e) => warn!("seen-marker purge failed: {e}"),
        }
    }

    Ok(WorkflowResult {
        fetched,
        new_items,
        notified,
        completed_at: unix_to_iso(now_unix_secs()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteSeenStore;

    fn test_config() -> Config {
        Config {
            listing_url: "http://unused.invalid".to_string(),
            permalink_base_url: "https://example.com".to_string(),
            bot_token: None,
            chat_id: None,
            telegram_api_url: "https://api.telegram.org".to_string(),
            db_path: ":memory:".to_string(),
            api_port: 0,
            log_level: "info".to_string(),
            scrape_interval_secs: 1800,
        }
    }

    #[tokio::test]
    async fn zero_chunk_document_reports_zero_counts() {
        let cfg = test_config();
        let result = process_document::<SqliteSeenStore>(
            &cfg,
            "<html>nothing embedded</html>",
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(result.fetched, 0);
        assert_eq!(result.new_items, 0);
        assert_eq!(result.notified, 0);
        assert!(!result.completed_at.is_empty());
    }

    #[tokio::test]
    async fn second_run_sees_no_new_records() {
        let cfg = test_config();
        let store = SqliteSeenStore::open(":memory:").await.unwrap();
        let doc = "<script>self.__next_f.push([1,\"listing:[{\\\\\\\"competition\\\\\\\":{\\\\\\\"id\\\\\\\":\\\\\\\"c1\\\\\\\",\\\\\\\"title\\\\\\\":\\\\\\\"First\\\\\\\"}}]\"])</script>";

        let first = process_document(&cfg, doc, Some(&store), None).await.unwrap();
        assert_eq!(first.fetched, 1);
        assert_eq!(first.new_items, 1);
        assert_eq!(first.notified, 0); // no notifier configured

        let second = process_document(&cfg, doc, Some(&store), None).await.unwrap();
        assert_eq!(second.fetched, 1);
        assert_eq!(second.new_items, 0);
    }
}
