//! SQLite-backed dead-letter queue. Schema mirrors spec.md §6 persisted
//! state: `(id, raw, reason, metadata_json, inserted_at)`.
//!
//! Grounded on the same `sqlx::SqlitePool` + `CREATE TABLE IF NOT
//! EXISTS` shape as `signalrt_checkpoint::SqliteCheckpointStore`.

use async_trait::async_trait;
use sqlx::Row;

use crate::{DeadLetterQueue, DlqEntry, Result};

pub struct SqliteDlq {
    pool: sqlx::SqlitePool,
}

impl SqliteDlq {
    pub async fn connect(path: &str) -> Result<Self> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = sqlx::SqlitePool::connect(&url).await?;
        Self::init(&pool).await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(pool: &sqlx::SqlitePool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS dead_letters (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                raw           TEXT    NOT NULL,
                reason        TEXT    NOT NULL,
                metadata_json TEXT    NOT NULL,
                inserted_at   INTEGER NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DeadLetterQueue for SqliteDlq {
    async fn send(&self, raw: &str, reason: &str, metadata: serde_json::Value) {
        let metadata_json = metadata.to_string();
        let inserted_at = signalrt_common::time::now_millis() / 1000;
        let result = sqlx::query(
            "INSERT INTO dead_letters (raw, reason, metadata_json, inserted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(raw)
        .bind(reason)
        .bind(&metadata_json)
        .bind(inserted_at)
        .execute(&self.pool)
        .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, reason, "failed to write dlq entry");
        }
    }

    async fn inspect(&self) -> Result<Vec<DlqEntry>> {
        let rows = sqlx::query(
            "SELECT id, raw, reason, metadata_json, inserted_at FROM dead_letters ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let metadata_json: String = row.try_get("metadata_json")?;
                Ok(DlqEntry {
                    id: row.try_get("id")?,
                    raw: row.try_get("raw")?,
                    reason: row.try_get("reason")?,
                    metadata: serde_json::from_str(&metadata_json)
                        .unwrap_or(serde_json::Value::Null),
                    inserted_at: row.try_get("inserted_at")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn dlq() -> SqliteDlq {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteDlq::init(&pool).await.unwrap();
        SqliteDlq::new(pool)
    }

    #[tokio::test]
    async fn records_and_reads_back_entry() {
        let dlq = dlq().await;
        dlq.send("raw payload", "parse_failed", json!({"worker_id": 1}))
            .await;

        let entries = dlq.inspect().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].raw, "raw payload");
        assert_eq!(entries[0].reason, "parse_failed");
        assert_eq!(entries[0].metadata["worker_id"], 1);
    }

    #[tokio::test]
    async fn entries_are_returned_in_insertion_order() {
        let dlq = dlq().await;
        dlq.send("first", "parse_failed", json!({})).await;
        dlq.send("second", "command_failed", json!({})).await;

        let entries = dlq.inspect().await.unwrap();
        assert_eq!(entries[0].raw, "first");
        assert_eq!(entries[1].raw, "second");
    }
}
