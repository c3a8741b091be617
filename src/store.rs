//! Persistent seen-marker store.
//!
//! Presence of a marker for an id means that id must not be notified again
//! until the marker expires (90 days). Modeled as an injected capability so
//! the pipeline stages stay testable without storage.

use std::future::Future;

use crate::config::SEEN_TTL_SECS;
use crate::error::Result;
use crate::types::{now_unix_secs, unix_to_iso};

pub trait SeenStore: Send + Sync {
    fn contains(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;
    fn mark(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
    fn purge_expired(&self) -> impl Future<Output = Result<u64>> + Send;
}

fn seen_key(id: &str) -> String {
    format!("seen:{id}")
}

/// SQLite-backed store: `seen_markers(key, value, expires_at)`, key is
/// `seen:{id}`, value a small JSON document, expiry filtered on lookup and
/// purged opportunistically once per run.
#[derive(Clone)]
pub struct SqliteSeenStore {
    pool: sqlx::SqlitePool,
}

impl SqliteSeenStore {
    pub async fn open(db_path: &str) -> Result<Self> {
        let url = if db_path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{db_path}?mode=rwc")
        };
        Self::open_url(&url).await
    }

    async fn open_url(url: &str) -> Result<Self> {
        // Single connection: SQLite serializes writers anyway, and an
        // in-memory database exists per connection.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl SeenStore for SqliteSeenStore {
    async fn contains(&self, id: &str) -> Result<bool> {
        let now = now_unix_secs() as i64;
        let row: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM seen_markers WHERE key = ? AND expires_at > ?")
                .bind(seen_key(id))
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn mark(&self, id: &str) -> Result<()> {
        let now = now_unix_secs();
        let value = serde_json::json!({ "id": id, "storedAt": unix_to_iso(now) });
        sqlx::query("INSERT OR REPLACE INTO seen_markers (key, value, expires_at) VALUES (?, ?, ?)")
            .bind(seen_key(id))
            .bind(value.to_string())
            .bind((now + SEEN_TTL_SECS) as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = now_unix_secs() as i64;
        let result = sqlx::query("DELETE FROM seen_markers WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
