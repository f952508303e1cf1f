use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::warn;

use crate::CheckpointStore;

/// Redis-backed checkpoint store, grounded on
/// `original_source/signal_client/infrastructure/storage/redis.py`:
/// each source gets a hash of seen timestamps (`HSET`/`HEXISTS`) rather
/// than one key per `(source, timestamp)` pair, keeping key count
/// bounded by distinct sources.
pub struct RedisCheckpointStore {
    conn: Mutex<redis::aio::ConnectionManager>,
}

impl RedisCheckpointStore {
    pub async fn connect(host: &str, port: u16) -> crate::Result<Self> {
        let client = redis::Client::open(format!("redis://{host}:{port}/0"))?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn key(source: &str) -> String {
        format!("checkpoint:{source}")
    }
}

#[async_trait]
impl CheckpointStore for RedisCheckpointStore {
    async fn is_duplicate(&self, source: &str, timestamp: i64) -> bool {
        let mut conn = self.conn.lock().await;
        let result: redis::RedisResult<bool> =
            conn.hexists(Self::key(source), timestamp).await;
        match result {
            Ok(exists) => exists,
            Err(err) => {
                warn!(error = %err, source, timestamp, "checkpoint lookup failed, treating as not duplicate");
                false
            },
        }
    }

    async fn mark_processed(&self, source: &str, timestamp: i64) {
        let mut conn = self.conn.lock().await;
        let result: redis::RedisResult<()> =
            conn.hset(Self::key(source), timestamp, 1_i64).await;
        if let Err(err) = result {
            warn!(error = %err, source, timestamp, "failed to mark checkpoint processed");
        }
    }
}
