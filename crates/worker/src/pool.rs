//! `WorkerPool` (C8): owns the ingress queue, shard queues, distributor
//! task, and worker tasks. Topology and stop/join semantics ported 1:1
//! from `original_source/.../worker_pool.py::WorkerPool`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signalrt_protocol::QueuedMessage;
use signalrt_router::{Command, Middleware};
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::WorkerPoolConfig;
use crate::deps::WorkerDeps;
use crate::{distributor, worker};

/// Sharded pool of workers dispatching inbound messages through the
/// command router and middleware chain (C8).
pub struct WorkerPool {
    config: WorkerPoolConfig,
    deps: Arc<WorkerDeps>,
    ingress_tx: mpsc::Sender<QueuedMessage>,
    ingress_rx: Mutex<Option<mpsc::Receiver<QueuedMessage>>>,
    stop: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl WorkerPool {
    /// Build a pool with default dependencies (no checkpoint store, no
    /// DLQ, a fresh [`signalrt_locks::LockManager`]). Use
    /// [`WorkerPool::with_deps`] to supply a pre-configured
    /// [`WorkerDeps`] instead.
    ///
    /// # Panics
    /// Panics if `config.shard_count` is zero or exceeds `config.pool_size`
    /// (ported validation from the original's `start()`).
    #[must_use]
    pub fn new(config: WorkerPoolConfig) -> Self {
        Self::with_deps(config, WorkerDeps::new())
    }

    /// Build a pool around a caller-configured [`WorkerDeps`] (checkpoint
    /// store, DLQ, lock manager already attached).
    ///
    /// # Panics
    /// Panics if `config.shard_count` is zero or exceeds `config.pool_size`.
    #[must_use]
    pub fn with_deps(config: WorkerPoolConfig, deps: WorkerDeps) -> Self {
        assert!(config.shard_count > 0, "shard_count must be positive");
        assert!(
            config.pool_size >= config.shard_count,
            "pool_size must be >= shard_count"
        );
        let (ingress_tx, ingress_rx) = mpsc::channel(config.ingress_capacity.max(1));
        Self {
            config,
            deps: Arc::new(deps),
            ingress_tx,
            ingress_rx: Mutex::new(Some(ingress_rx)),
            stop: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// A handle to the ingress queue's sender, for the listener glue
    /// task (or tests) to push parsed/raw frames in.
    #[must_use]
    pub fn ingress(&self) -> mpsc::Sender<QueuedMessage> {
        self.ingress_tx.clone()
    }

    /// Register a command. Idempotent on `command`'s `Arc` identity.
    pub async fn register(&self, command: Arc<Command>) {
        self.deps.router.write().await.register(command);
    }

    /// Register a middleware. Idempotent on `middleware`'s `Arc` identity.
    pub async fn register_middleware(&self, middleware: Arc<dyn Middleware>) {
        self.deps.middleware.write().await.register(middleware);
    }

    /// Spawn the distributor task and `pool_size` worker tasks. A
    /// second call is a no-op.
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let Some(ingress_rx) = self.ingress_rx.lock().await.take() else {
            return;
        };

        let per_shard = self.config.per_shard_capacity();
        let mut shard_txs = Vec::with_capacity(self.config.shard_count);
        let mut shard_rxs = Vec::with_capacity(self.config.shard_count);
        for _ in 0..self.config.shard_count {
            let (tx, rx) = mpsc::channel(per_shard);
            shard_txs.push(tx);
            shard_rxs.push(Arc::new(Mutex::new(rx)));
        }

        let mut tasks = self.tasks.lock().await;
        tasks.push(tokio::spawn(distributor::run(
            ingress_rx,
            shard_txs,
            self.deps.clone(),
            self.stop.clone(),
        )));

        // shard_count may be < pool_size (spec.md §4.6: "shard_count ...
        // must be <= pool_size"), so several workers can share one
        // shard's receiving end. `mpsc::Receiver` is single-consumer, so
        // the receiver is wrapped and workers take turns under the lock
        // rather than each owning a distinct receiver.
        for worker_id in 0..self.config.pool_size {
            let shard_id = worker_id % self.config.shard_count;
            let shard_rx = shard_rxs[shard_id].clone();
            tasks.push(tokio::spawn(worker::run(
                worker_id,
                shard_id,
                shard_rx,
                self.deps.clone(),
                self.stop.clone(),
            )));
        }

        info!(
            pool_size = self.config.pool_size,
            shard_count = self.config.shard_count,
            "worker pool started"
        );
    }

    /// Signal the distributor and all workers to drain and exit. Does
    /// not wait for them — call [`WorkerPool::join`] for that.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Await every spawned task. Safe to call once `stop()` has been
    /// called; blocks forever otherwise since the pool never exits on
    /// its own.
    pub async fn join(&self) {
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            let _ = task.await;
        }
    }
}
