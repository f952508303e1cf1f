//! Per-recipient lock manager (C6), ensuring dispatch for a given
//! conversation is serialized even when a shard holds several
//! recipients.
//!
//! Ported from `signal_client/services/lock_manager.py::LockManager`:
//! a map of resource mutexes guarded by a manager-wide mutex for
//! insertion; `lock()` returns a guard scoping the resource mutex.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

#[derive(Default)]
pub struct LockManager {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Holds the resource mutex for the lifetime of the scoped region;
/// releases it on drop.
pub struct LockGuard {
    _guard: OwnedMutexGuard<()>,
}

impl LockManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutex for `resource_id`, creating it on first use.
    /// Eviction is not implemented: long-running deployments may want to
    /// periodically prune entries with no outstanding waiters, but
    /// correctness does not depend on it.
    pub async fn lock(&self, resource_id: &str) -> LockGuard {
        let resource_lock = {
            let mut locks: MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> =
                self.locks.lock().await;
            locks
                .entry(resource_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = resource_lock.lock_owned().await;
        LockGuard { _guard: guard }
    }

    /// Number of distinct recipients currently tracked, for metrics and
    /// tests.
    pub async fn tracked_resources(&self) -> usize {
        self.locks.lock().await.len()
    }
}
