//! Checkpoint store (C4): tracks `(source, timestamp)` pairs already
//! dispatched so the worker pool can suppress duplicate delivery of the
//! same message (Signal's WebSocket gateway can redeliver on reconnect).
//!
//! Three backends selected by `storage.type`, all implementing
//! [`CheckpointStore`]. Per spec.md §7, checkpoint failures are
//! non-fatal: a lookup failure is treated as "not a duplicate" (better
//! to double-dispatch than drop a message), and a mark failure is
//! logged and swallowed.

mod error;
mod memory;
mod redis_store;
mod sqlite;

pub use error::{Error, Result};
pub use memory::MemoryCheckpointStore;
pub use redis_store::RedisCheckpointStore;
pub use sqlite::SqliteCheckpointStore;

use async_trait::async_trait;

/// Deduplication store keyed on `(source, timestamp)`.
///
/// Implementations must not panic or propagate storage errors to
/// callers — see module docs for the non-fatal failure policy.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Returns `true` if `(source, timestamp)` was already marked processed.
    async fn is_duplicate(&self, source: &str, timestamp: i64) -> bool;

    /// Records `(source, timestamp)` as processed.
    async fn mark_processed(&self, source: &str, timestamp: i64);
}
