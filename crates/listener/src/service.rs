//! Listener Service (C9): the bounded ingress queue raw frames land in
//! before a worker ever sees them (spec.md §4.2).
//!
//! `tokio::sync::mpsc` only supports drop-newest-on-full (`try_send`)
//! natively; `DROP_OLDEST` needs to evict from the *consumer* end while
//! the producer is writing, which an `mpsc::Sender` cannot do. This is
//! a small hand-rolled bounded deque behind a mutex instead, with two
//! `Notify`s (space-available, item-available) playing the role
//! `mpsc`'s internal semaphore otherwise would.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;
use tracing::debug;

/// What happens when a frame arrives and the ingress queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// Drop the incoming frame, keep the queue as-is. Default.
    DropNewest,
    /// Suspend the caller (the WebSocket read loop) until space frees up,
    /// exerting TCP backpressure on the gateway.
    Block,
    /// Evict the oldest queued frame, then enqueue the new one.
    DropOldest,
}

impl Default for BackpressurePolicy {
    fn default() -> Self {
        Self::DropNewest
    }
}

struct Inner {
    queue: VecDeque<String>,
    closed: bool,
}

/// The bounded ingress queue the listener writes raw frames into and
/// the dispatcher glue reads them back out of. Never parses — see
/// module docs.
pub struct ListenerService {
    capacity: usize,
    policy: BackpressurePolicy,
    inner: Mutex<Inner>,
    item_available: Notify,
    space_available: Notify,
}

impl ListenerService {
    #[must_use]
    pub fn new(capacity: usize, policy: BackpressurePolicy) -> Self {
        Self {
            capacity: capacity.max(1),
            policy,
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
            }),
            item_available: Notify::new(),
            space_available: Notify::new(),
        }
    }

    /// Enqueue a raw frame, applying the configured backpressure policy
    /// if the queue is already full.
    pub async fn enqueue(&self, frame: String) {
        match self.policy {
            BackpressurePolicy::DropNewest => self.enqueue_drop_newest(frame),
            BackpressurePolicy::DropOldest => self.enqueue_drop_oldest(frame),
            BackpressurePolicy::Block => self.enqueue_block(frame).await,
        }
    }

    fn enqueue_drop_newest(&self, frame: String) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.queue.len() >= self.capacity {
            debug!(capacity = self.capacity, "ingress queue full, dropping newest frame");
            signalrt_metrics::counter!(
                signalrt_metrics::websocket::FRAMES_DROPPED_TOTAL,
                signalrt_metrics::labels::REASON => "drop_newest"
            )
            .increment(1);
            return;
        }
        inner.queue.push_back(frame);
        drop(inner);
        self.item_available.notify_one();
    }

    fn enqueue_drop_oldest(&self, frame: String) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.queue.len() >= self.capacity {
            inner.queue.pop_front();
            signalrt_metrics::counter!(
                signalrt_metrics::websocket::FRAMES_DROPPED_TOTAL,
                signalrt_metrics::labels::REASON => "drop_oldest"
            )
            .increment(1);
        }
        inner.queue.push_back(frame);
        drop(inner);
        self.item_available.notify_one();
    }

    async fn enqueue_block(&self, frame: String) {
        loop {
            {
                let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                if inner.closed || inner.queue.len() < self.capacity {
                    inner.queue.push_back(frame);
                    drop(inner);
                    self.item_available.notify_one();
                    return;
                }
            }
            self.space_available.notified().await;
        }
    }

    /// Suspend until a frame is available or the service is closed.
    pub async fn recv(&self) -> Option<String> {
        loop {
            {
                let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(frame) = inner.queue.pop_front() {
                    drop(inner);
                    self.space_available.notify_one();
                    return Some(frame);
                }
                if inner.closed {
                    return None;
                }
            }
            self.item_available.notified().await;
        }
    }

    /// Bounded-poll variant so a consumer loop can observe a stop
    /// signal between waits, matching the worker pool's shutdown model.
    pub async fn recv_timeout(&self, timeout: std::time::Duration) -> Option<String> {
        tokio::time::timeout(timeout, self.recv()).await.ok().flatten()
    }

    /// Wake any pending `recv`/`enqueue_block` waiters and make future
    /// `recv` calls return `None` once the queue drains.
    pub fn close(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).closed = true;
        self.item_available.notify_waiters();
        self.space_available.notify_waiters();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn drop_newest_discards_incoming_frame_when_full() {
        let service = ListenerService::new(1, BackpressurePolicy::DropNewest);
        service.enqueue("a".into()).await;
        service.enqueue("b".into()).await;
        assert_eq!(service.recv().await, Some("a".to_string()));
        assert_eq!(service.len(), 0);
    }

    #[tokio::test]
    async fn drop_oldest_evicts_head_then_enqueues() {
        let service = ListenerService::new(1, BackpressurePolicy::DropOldest);
        service.enqueue("a".into()).await;
        service.enqueue("b".into()).await;
        assert_eq!(service.recv().await, Some("b".to_string()));
        assert_eq!(service.len(), 0);
    }

    #[tokio::test]
    async fn block_suspends_producer_until_space_frees() {
        let service = Arc::new(ListenerService::new(1, BackpressurePolicy::Block));
        service.enqueue("a".into()).await;

        let producer = {
            let service = service.clone();
            tokio::spawn(async move {
                service.enqueue("b".into()).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());

        assert_eq!(service.recv().await, Some("a".to_string()));
        producer.await.unwrap();
        assert_eq!(service.recv().await, Some("b".to_string()));
    }

    #[tokio::test]
    async fn recv_returns_none_after_close_once_drained() {
        let service = ListenerService::new(4, BackpressurePolicy::DropNewest);
        service.enqueue("a".into()).await;
        service.close();
        assert_eq!(service.recv().await, Some("a".to_string()));
        assert_eq!(service.recv().await, None);
    }

    #[tokio::test]
    async fn recv_timeout_returns_none_when_empty() {
        let service = ListenerService::new(4, BackpressurePolicy::DropNewest);
        let result = service.recv_timeout(Duration::from_millis(10)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn fifo_order_is_preserved_under_normal_load() {
        let service = ListenerService::new(10, BackpressurePolicy::DropNewest);
        for i in 0..5 {
            service.enqueue(i.to_string()).await;
        }
        for i in 0..5 {
            assert_eq!(service.recv().await, Some(i.to_string()));
        }
    }
}
