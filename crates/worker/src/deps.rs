//! Shared dependencies threaded through the distributor and every
//! worker task.

use std::sync::Arc;

use signalrt_checkpoint::CheckpointStore;
use signalrt_dlq::DeadLetterQueue;
use signalrt_locks::LockManager;
use signalrt_router::{CommandRouter, MiddlewareChain, OutboundGateway};
use tokio::sync::RwLock;

/// Commands and middleware are behind `RwLock` rather than snapshotted
/// at worker-startup time (as the original's per-worker copy does) so
/// registrations made after [`crate::WorkerPool::start`] take effect
/// for every in-flight worker immediately.
pub struct WorkerDeps {
    pub router: RwLock<CommandRouter>,
    pub middleware: RwLock<MiddlewareChain>,
    pub checkpoint: Option<Arc<dyn CheckpointStore>>,
    pub dlq: Option<Arc<dyn DeadLetterQueue>>,
    pub locks: Arc<LockManager>,
    pub gateway: Option<Arc<dyn OutboundGateway>>,
    pub own_number: Option<Arc<str>>,
    /// Whether `MessageKind::Sync` messages (echoes from the user's own
    /// linked devices) are dispatched through the router. Defaults to
    /// `false` — see spec.md §9 Open Questions.
    pub dispatch_sync_messages: bool,
}

impl WorkerDeps {
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: RwLock::new(CommandRouter::new()),
            middleware: RwLock::new(MiddlewareChain::new()),
            checkpoint: None,
            dlq: None,
            locks: Arc::new(LockManager::new()),
            gateway: None,
            own_number: None,
            dispatch_sync_messages: false,
        }
    }

    #[must_use]
    pub fn with_checkpoint(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(store);
        self
    }

    #[must_use]
    pub fn with_dlq(mut self, dlq: Arc<dyn DeadLetterQueue>) -> Self {
        self.dlq = Some(dlq);
        self
    }

    #[must_use]
    pub fn with_locks(mut self, locks: Arc<LockManager>) -> Self {
        self.locks = locks;
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn OutboundGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    #[must_use]
    pub fn with_own_number(mut self, own_number: impl Into<Arc<str>>) -> Self {
        self.own_number = Some(own_number.into());
        self
    }

    #[must_use]
    pub fn with_dispatch_sync_messages(mut self, dispatch_sync_messages: bool) -> Self {
        self.dispatch_sync_messages = dispatch_sync_messages;
        self
    }
}

impl Default for WorkerDeps {
    fn default() -> Self {
        Self::new()
    }
}

/// Record a dead-lettered entry if a DLQ is configured; a no-op
/// otherwise (spec.md §4.9 — the DLQ is optional).
pub async fn send_to_dlq(
    dlq: Option<&Arc<dyn DeadLetterQueue>>,
    raw: &str,
    reason: &str,
    metadata: serde_json::Value,
) {
    if let Some(dlq) = dlq {
        dlq.send(raw, reason, metadata).await;
        signalrt_metrics::counter!(
            signalrt_metrics::dlq::ENTRIES_TOTAL,
            signalrt_metrics::labels::REASON => reason.to_string()
        )
        .increment(1);
    }
}

/// Mark `(source, timestamp)` processed if a checkpoint store is
/// configured; failures are logged and swallowed by the store itself
/// (spec.md §4.8).
pub async fn mark_checkpoint(checkpoint: Option<&Arc<dyn CheckpointStore>>, source: &str, timestamp: i64) {
    if let Some(checkpoint) = checkpoint {
        checkpoint.mark_processed(source, timestamp).await;
    }
}

/// `true` if the checkpoint store reports `(source, timestamp)` as a
/// duplicate. No store configured means dedup is disabled.
pub async fn is_duplicate(checkpoint: Option<&Arc<dyn CheckpointStore>>, source: &str, timestamp: i64) -> bool {
    match checkpoint {
        Some(checkpoint) => checkpoint.is_duplicate(source, timestamp).await,
        None => false,
    }
}
