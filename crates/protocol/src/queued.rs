//! The mutable transit wrapper threaded through the ingress and per-shard
//! queues, ported from `signal_client/runtime/models.py::QueuedMessage`.

use std::fmt;
use tokio::time::Instant;

use crate::message::Message;

/// An acknowledgement callback, invoked once a message has either been
/// fully processed or permanently dead-lettered. Boxed because each
/// enqueue site closes over a different checkpoint/metrics context.
pub type Ack = Box<dyn FnOnce() + Send>;

/// A frame in flight between the listener and a worker.
///
/// `message` is `None` when [`crate::envelope::parse`] failed; the raw
/// frame is still routed (by best-effort recipient extraction) so it can
/// be logged and dead-lettered rather than silently dropped.
pub struct QueuedMessage {
    pub raw: String,
    pub enqueued_at: Instant,
    pub recipient: Option<String>,
    pub message: Option<Message>,
    pub ack: Option<Ack>,
}

impl QueuedMessage {
    #[must_use]
    pub fn new(raw: String, recipient: Option<String>, message: Option<Message>) -> Self {
        Self {
            raw,
            enqueued_at: Instant::now(),
            recipient,
            message,
            ack: None,
        }
    }

    #[must_use]
    pub fn with_ack(mut self, ack: Ack) -> Self {
        self.ack = Some(ack);
        self
    }

    /// Time spent sitting in a queue before a worker picked it up.
    #[must_use]
    pub fn queue_latency(&self) -> std::time::Duration {
        self.enqueued_at.elapsed()
    }

    pub fn acknowledge(&mut self) {
        if let Some(ack) = self.ack.take() {
            ack();
        }
    }
}

impl fmt::Debug for QueuedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedMessage")
            .field("recipient", &self.recipient)
            .field("has_message", &self.message.is_some())
            .field("queue_latency", &self.queue_latency())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_has_no_ack_by_default() {
        let msg = QueuedMessage::new("{}".into(), Some("+1".into()), None);
        assert!(msg.ack.is_none());
    }

    #[test]
    fn acknowledge_invokes_callback_once() {
        let counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter2 = counter.clone();
        let mut msg = QueuedMessage::new("{}".into(), None, None)
            .with_ack(Box::new(move || {
                counter2.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }));
        msg.acknowledge();
        msg.acknowledge();
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
