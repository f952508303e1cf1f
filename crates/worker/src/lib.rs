//! Sharded worker pool: ingress distribution, per-recipient locking,
//! dedup, command routing, and middleware dispatch (C8).
//!
//! [`distributor`] fans inbound [`signalrt_protocol::QueuedMessage`]s out
//! to shard queues by recipient. [`worker`] drains one shard queue,
//! deduplicating via the configured [`signalrt_checkpoint::CheckpointStore`]
//! and dispatching through [`signalrt_router`]. [`WorkerPool`] owns the
//! topology and task lifecycle.

pub mod config;
pub mod deps;
pub mod distributor;
pub mod pool;
pub mod worker;

pub use config::WorkerPoolConfig;
pub use deps::WorkerDeps;
pub use pool::WorkerPool;
