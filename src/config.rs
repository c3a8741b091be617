use crate::error::{AppError, Result};

pub const LISTING_URL: &str = "https://competitionshub.com/competitions";
pub const PERMALINK_BASE_URL: &str = "https://competitionshub.com";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Fixed desktop-browser user agent for the listing fetch. The site serves a
/// stripped mobile shell (without the embedded flight payload) to unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Wrapper pattern around each serialized flight fragment in the page source.
/// The fragment body between prefix and suffix is a JS string literal body.
pub const CHUNK_PUSH_PREFIX: &str = "self.__next_f.push([1,\"";
pub const CHUNK_PUSH_SUFFIX: &str = "\"])";

/// Record marker at the once-decoded layer. The chunk still carries one level
/// of JSON string escaping at this point, so the quotes appear as `\"`.
pub const RECORD_MARKER: &str = "{\\\"competition\\\":";

/// Message body budget in characters. Telegram caps at 4096; headroom left
/// for the API's own entity accounting.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Descriptions longer than this are cut to DESCRIPTION_TRUNCATE_AT chars plus an ellipsis.
pub const DESCRIPTION_MAX_LEN: usize = 160;
pub const DESCRIPTION_TRUNCATE_AT: usize = 157;

/// Seen-marker expiry: 90 days.
pub const SEEN_TTL_SECS: u64 = 90 * 24 * 3600;

/// Pause between consecutive Telegram sends (rate-limit courtesy).
pub const SEND_PAUSE_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub listing_url: String,
    pub permalink_base_url: String,
    /// Bot token (TELEGRAM_BOT_TOKEN). Notifications are skipped when unset.
    pub bot_token: Option<String>,
    /// Target chat (TELEGRAM_CHAT_ID). Notifications are skipped when unset.
    pub chat_id: Option<String>,
    pub telegram_api_url: String,
    pub db_path: String,
    pub api_port: u16,
    pub log_level: String,
    /// Scheduled run interval in seconds (SCRAPE_INTERVAL_SECS).
    pub scrape_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            listing_url: std::env::var("LISTING_URL").unwrap_or_else(|_| LISTING_URL.to_string()),
            permalink_base_url: std::env::var("PERMALINK_BASE_URL")
                .unwrap_or_else(|_| PERMALINK_BASE_URL.to_string()),
            bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            chat_id: std::env::var("TELEGRAM_CHAT_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| TELEGRAM_API_URL.to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "watcher.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            scrape_interval_secs: std::env::var("SCRAPE_INTERVAL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse::<u64>()
                .unwrap_or(1800),
        })
    }
}
