//! Distributor task (part of C8): pulls from the ingress queue, parses
//! if necessary, computes the shard index, and forwards into the
//! matching shard queue. Ported from
//! `original_source/.../worker_pool.py::WorkerPool._distribute_messages`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use signalrt_protocol::QueuedMessage;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::deps::{WorkerDeps, send_to_dlq};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shard `recipient` into `[0, shard_count)`. An empty/missing
/// recipient always routes to shard 0.
#[must_use]
pub fn shard_index(recipient: Option<&str>, shard_count: usize) -> usize {
    let Some(recipient) = recipient.filter(|r| !r.is_empty()) else {
        return 0;
    };
    if shard_count == 0 {
        return 0;
    }
    (crc32fast::hash(recipient.as_bytes()) as usize) % shard_count
}

/// Run the distributor loop until `stop` is cancelled and the ingress
/// queue has drained.
pub async fn run(
    mut ingress_rx: Receiver<QueuedMessage>,
    shard_txs: Vec<Sender<QueuedMessage>>,
    deps: Arc<WorkerDeps>,
    stop: CancellationToken,
) {
    loop {
        let item = if stop.is_cancelled() {
            match ingress_rx.try_recv() {
                Ok(item) => item,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return,
            }
        } else {
            match tokio::time::timeout(POLL_INTERVAL, ingress_rx.recv()).await {
                Ok(Some(item)) => item,
                Ok(None) => return,
                Err(_) => continue,
            }
        };

        distribute_one(item, &shard_txs, &deps).await;
    }
}

async fn distribute_one(mut item: QueuedMessage, shard_txs: &[Sender<QueuedMessage>], deps: &WorkerDeps) {
    if item.message.is_none() {
        match signalrt_protocol::parse(&item.raw) {
            Ok(message) => item.message = Some(message),
            Err(signalrt_protocol::Error::Unsupported) => {
                // Still routed below so the worker can apply the same
                // drop-silently handling with access to the raw frame.
            },
            Err(error) => {
                warn!(%error, "distributor failed to parse frame");
                send_to_dlq(deps.dlq.as_ref(), &item.raw, "parse_failed", json!({})).await;
                item.acknowledge();
                return;
            },
        }
    }

    let recipient = match &item.message {
        Some(message) => Some(message.recipient().to_string()),
        None => item
            .recipient
            .clone()
            .or_else(|| signalrt_protocol::recipient_from_raw(&item.raw)),
    };
    item.recipient = recipient.clone();

    let shard = shard_index(recipient.as_deref(), shard_txs.len());
    let Some(tx) = shard_txs.get(shard) else {
        debug!(shard, "no shard queue for computed index, dropping");
        item.acknowledge();
        return;
    };

    if tx.send(item).await.is_err() {
        warn!(shard, "shard queue closed, message dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recipient_routes_to_shard_zero() {
        assert_eq!(shard_index(None, 4), 0);
        assert_eq!(shard_index(Some(""), 4), 0);
    }

    #[test]
    fn same_recipient_always_hashes_to_same_shard() {
        let a = shard_index(Some("+15551234567"), 8);
        let b = shard_index(Some("+15551234567"), 8);
        assert_eq!(a, b);
        assert!(a < 8);
    }

    #[test]
    fn zero_shards_never_panics() {
        assert_eq!(shard_index(Some("+1"), 0), 0);
    }
}
