use async_trait::async_trait;
use tracing::warn;

use crate::CheckpointStore;

/// SQLite-backed checkpoint store. Schema mirrors spec.md §6 persisted
/// state: `(source TEXT, timestamp INTEGER, PRIMARY KEY(source, timestamp))`.
///
/// Grounded on `crates/projects/src/store.rs::SqliteProjectStore`: a
/// migration-free `CREATE TABLE IF NOT EXISTS` plus `query_as` row
/// mapping over a `sqlx::SqlitePool`.
pub struct SqliteCheckpointStore {
    pool: sqlx::SqlitePool,
}

impl SqliteCheckpointStore {
    /// Connect to (or create) the SQLite database at `path` and ensure
    /// the checkpoint table exists.
    pub async fn connect(path: &str) -> crate::Result<Self> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = sqlx::SqlitePool::connect(&url).await?;
        Self::init(&pool).await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the checkpoints table schema. Retained (rather than
    /// managed purely by migrations) so tests can use `sqlite::memory:`.
    pub async fn init(pool: &sqlx::SqlitePool) -> crate::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS checkpoints (
                source    TEXT    NOT NULL,
                timestamp INTEGER NOT NULL,
                PRIMARY KEY (source, timestamp)
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn is_duplicate(&self, source: &str, timestamp: i64) -> bool {
        let result =
            sqlx::query_scalar::<_, i64>("SELECT 1 FROM checkpoints WHERE source = ? AND timestamp = ?")
                .bind(source)
                .bind(timestamp)
                .fetch_optional(&self.pool)
                .await;
        match result {
            Ok(row) => row.is_some(),
            Err(err) => {
                warn!(error = %err, source, timestamp, "checkpoint lookup failed, treating as not duplicate");
                false
            },
        }
    }

    async fn mark_processed(&self, source: &str, timestamp: i64) {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO checkpoints (source, timestamp) VALUES (?, ?)",
        )
        .bind(source)
        .bind(timestamp)
        .execute(&self.pool)
        .await;
        if let Err(err) = result {
            warn!(error = %err, source, timestamp, "failed to mark checkpoint processed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteCheckpointStore {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteCheckpointStore::init(&pool).await.unwrap();
        SqliteCheckpointStore::new(pool)
    }

    #[tokio::test]
    async fn marks_and_detects_duplicate() {
        let store = store().await;
        assert!(!store.is_duplicate("+1555", 42).await);
        store.mark_processed("+1555", 42).await;
        assert!(store.is_duplicate("+1555", 42).await);
    }

    #[tokio::test]
    async fn distinct_sources_do_not_collide() {
        let store = store().await;
        store.mark_processed("+1555", 42).await;
        assert!(!store.is_duplicate("+1556", 42).await);
    }

    #[tokio::test]
    async fn marking_twice_is_idempotent() {
        let store = store().await;
        store.mark_processed("+1555", 42).await;
        store.mark_processed("+1555", 42).await;
        assert!(store.is_duplicate("+1555", 42).await);
    }
}
