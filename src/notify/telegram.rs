//! Outbound transport: Telegram Bot API sendMessage.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{Config, SEND_PAUSE_MS};
use crate::error::{AppError, Result};
use crate::notify::batch::OutboundMessage;

#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// None when bot token or chat id is unset; notification is then skipped
    /// for the run, which is not an error.
    pub fn from_config(cfg: &Config) -> Option<Self> {
        let token = cfg.bot_token.clone()?;
        let chat_id = cfg.chat_id.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_url: cfg.telegram_api_url.clone(),
            token,
            chat_id,
        })
    }

    /// Send messages strictly in order, one at a time, with a short pause
    /// between sends. A failed send is logged and skipped, never escalated:
    /// seen markers are already committed, so a retry of the whole run would
    /// only duplicate what did get through. Returns the number of records
    /// carried by successfully delivered messages.
    pub async fn send_all(&self, messages: &[OutboundMessage]) -> usize {
        let mut notified = 0;
        for (i, msg) in messages.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(SEND_PAUSE_MS)).await;
            }
            match self.send(&msg.text).await {
                Ok(()) => notified += msg.record_count,
                Err(e) => warn!(
                    "message {}/{} failed ({} records unnotified): {e}",
                    i + 1,
                    messages.len(),
                    msg.record_count
                ),
            }
        }
        info!("delivered {notified} records across {} messages", messages.len());
        notified
    }

    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "MarkdownV2"),
                ("disable_web_page_preview", "true"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::TelegramStatus(resp.status().as_u16()));
        }
        Ok(())
    }
}
