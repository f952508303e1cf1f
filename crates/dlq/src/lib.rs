//! Dead-letter queue (C5): records messages and commands the worker
//! pool could not process — parse failures, unsupported command
//! handlers raising, etc. — for later operator inspection via
//! `signalrt dlq inspect`.
//!
//! `send` is the hot path invoked from the worker pool and never
//! propagates a storage error (logged and swallowed per spec.md §7).
//! `inspect` is the cold path invoked from the CLI and does propagate
//! I/O errors, since a failed read there should exit non-zero.

mod error;
mod file;
mod memory;
mod sqlite;

pub use error::{Error, Result};
pub use file::FileDlq;
pub use memory::MemoryDlq;
pub use sqlite::SqliteDlq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single dead-lettered entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqEntry {
    pub id: i64,
    /// The raw message payload (JSON text) that failed processing.
    pub raw: String,
    /// Short machine-readable cause, e.g. `"parse_failed"` or `"command_failed"`.
    pub reason: String,
    /// Structured context: command name, trigger, worker/shard id, error detail.
    pub metadata: serde_json::Value,
    /// Unix timestamp (seconds) the entry was recorded.
    pub inserted_at: i64,
}

#[async_trait]
pub trait DeadLetterQueue: Send + Sync {
    /// Record a dead-lettered entry. Failures are logged and swallowed.
    async fn send(&self, raw: &str, reason: &str, metadata: serde_json::Value);

    /// Return all recorded entries, oldest first.
    async fn inspect(&self) -> Result<Vec<DlqEntry>>;
}
