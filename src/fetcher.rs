//! Listing page fetch: one GET per run, fatal on non-2xx.

use std::time::Duration;

use reqwest::header;
use tracing::debug;

use crate::config::{Config, USER_AGENT};
use crate::error::{AppError, Result};

pub async fn fetch_listing(cfg: &Config) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let resp = client
        .get(&cfg.listing_url)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, "text/html")
        // The listing must never be served from a cache: stale pages would
        // hide new records until the cache expires.
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::PRAGMA, "no-cache")
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::FetchStatus(status.as_u16()));
    }

    let body = resp.text().await?;
    debug!("fetched {} bytes from {}", body.len(), cfg.listing_url);
    Ok(body)
}
