mod api;
mod config;
mod dedup;
mod error;
mod extract;
mod fetcher;
mod notify;
mod store;
mod types;
mod workflow;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::notify::TelegramNotifier;
use crate::store::SqliteSeenStore;
use crate::workflow::run_workflow;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        "watching {} every {}s (notifications {})",
        cfg.listing_url,
        cfg.scrape_interval_secs,
        if cfg.bot_token.is_some() && cfg.chat_id.is_some() {
            "enabled"
        } else {
            "disabled"
        },
    );

    // Seen store. Failure to open degrades to fail-open dedup rather than
    // aborting: better duplicate notifications than none at all.
    let store = match SqliteSeenStore::open(&cfg.db_path).await {
        Ok(s) => {
            info!("Seen store ready at {}", cfg.db_path);
            Some(s)
        }
        Err(e) => {
            warn!("seen store unavailable ({e}), every record will be treated as new");
            None
        }
    };

    let notifier = TelegramNotifier::from_config(&cfg).map(Arc::new);
    if notifier.is_none() {
        warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, notifications disabled");
    }

    // Scheduled runs. One run at a time per process; the interval delays
    // missed ticks instead of bursting.
    let sched_cfg = cfg.clone();
    let sched_store = store.clone();
    let sched_notifier = notifier.clone();
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(sched_cfg.scrape_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match run_workflow(&sched_cfg, sched_store.as_ref(), sched_notifier.as_deref()).await
            {
                Ok(r) => info!(
                    "scheduled run complete: fetched={} new={} notified={}",
                    r.fetched, r.new_items, r.notified
                ),
                Err(e) => error!("scheduled run failed: {e}"),
            }
        }
    });

    let app = router(ApiState {
        cfg: cfg.clone(),
        store,
        notifier,
    });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
