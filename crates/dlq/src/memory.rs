//! In-process dead-letter queue, backed by a `Vec` behind a mutex.
//!
//! Suitable for development and for deployments where DLQ durability
//! across restarts doesn't matter (the checkpoint/DLQ split means a
//! lost in-memory DLQ entry never causes double-dispatch, only a lost
//! forensic record).

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{DeadLetterQueue, DlqEntry, Result};

#[derive(Default)]
pub struct MemoryDlq {
    entries: Mutex<Vec<DlqEntry>>,
    next_id: Mutex<i64>,
}

impl MemoryDlq {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeadLetterQueue for MemoryDlq {
    async fn send(&self, raw: &str, reason: &str, metadata: serde_json::Value) {
        let id = {
            let mut next_id = self.next_id.lock().await;
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.entries.lock().await.push(DlqEntry {
            id,
            raw: raw.to_string(),
            reason: reason.to_string(),
            metadata,
            inserted_at: signalrt_common::time::now_millis() / 1000,
        });
    }

    async fn inspect(&self) -> Result<Vec<DlqEntry>> {
        Ok(self.entries.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_entries_in_order() {
        let dlq = MemoryDlq::new();
        dlq.send("raw-1", "parse_failed", json!({})).await;
        dlq.send("raw-2", "command_failed", json!({"command": "ping"}))
            .await;

        let entries = dlq.inspect().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].raw, "raw-1");
        assert_eq!(entries[1].reason, "command_failed");
        assert_ne!(entries[0].id, entries[1].id);
    }
}
