use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::CheckpointStore;

const DEFAULT_CAPACITY: usize = 10_000;

/// In-process checkpoint store bounded by an LRU of `(source, timestamp)`
/// keys, so long-running processes don't grow memory unbounded. Oldest
/// entries are evicted first once capacity is reached — a false negative
/// on ancient duplicates is an acceptable tradeoff for bounded memory.
pub struct MemoryCheckpointStore {
    seen: Mutex<LruCache<(String, i64), ()>>,
}

impl MemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            seen: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn is_duplicate(&self, source: &str, timestamp: i64) -> bool {
        self.seen
            .lock()
            .await
            .contains(&(source.to_string(), timestamp))
    }

    async fn mark_processed(&self, source: &str, timestamp: i64) {
        self.seen
            .lock()
            .await
            .put((source.to_string(), timestamp), ());
    }
}
