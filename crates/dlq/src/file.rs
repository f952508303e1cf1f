//! Append-only JSON-lines file dead-letter queue — the ambient "file"
//! backend spec.md §4.9 mentions alongside memory and SQLite, useful
//! for single-binary deployments without a database.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::{DeadLetterQueue, DlqEntry, Result};

pub struct FileDlq {
    path: std::path::PathBuf,
    next_id: Mutex<i64>,
}

impl FileDlq {
    /// Open (creating if absent) the JSON-lines file at `path`, seeding
    /// the id counter from any entries already present.
    pub async fn open(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tokio::fs::File::create(&path).await?;
        }
        let existing = read_all(&path).await?;
        let next_id = existing.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }
}

async fn read_all(path: &std::path::Path) -> Result<Vec<DlqEntry>> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut entries = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<DlqEntry>(&line) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[async_trait]
impl DeadLetterQueue for FileDlq {
    async fn send(&self, raw: &str, reason: &str, metadata: serde_json::Value) {
        let id = {
            let mut next_id = self.next_id.lock().await;
            let id = *next_id;
            *next_id += 1;
            id
        };
        let entry = DlqEntry {
            id,
            raw: raw.to_string(),
            reason: reason.to_string(),
            metadata,
            inserted_at: signalrt_common::time::now_millis() / 1000,
        };
        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, reason, "failed to serialize dlq entry");
                return;
            },
        };
        if let Err(err) = append_line(&self.path, &line).await {
            tracing::warn!(error = %err, reason, "failed to write dlq entry to file");
        }
    }

    async fn inspect(&self) -> Result<Vec<DlqEntry>> {
        read_all(&self.path).await
    }
}

async fn append_line(path: &std::path::Path, line: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new().append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    Ok(())
}
