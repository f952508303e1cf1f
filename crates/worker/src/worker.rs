//! Worker task (part of C8): dequeues from one shard, dedups, locks,
//! routes, and dispatches through the middleware chain. Ported from
//! `original_source/.../worker_pool.py::Worker.process_messages` /
//! `Worker.process` / `Worker._dispatch_message`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use signalrt_protocol::{Message, MessageKind, QueuedMessage};
use signalrt_router::DispatchContext;
use tokio::sync::Mutex;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::deps::{WorkerDeps, is_duplicate, mark_checkpoint, send_to_dlq};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Run one worker's shard-poll loop until `stop` is cancelled and its
/// shard queue has drained. `shard_rx` is shared (`shard_count` can be
/// `< pool_size`, so several workers poll the same shard) — each poll
/// takes the lock only for the duration of one `recv`/`try_recv`.
pub async fn run(
    worker_id: usize,
    shard_id: usize,
    shard_rx: Arc<Mutex<Receiver<QueuedMessage>>>,
    deps: Arc<WorkerDeps>,
    stop: CancellationToken,
) {
    loop {
        let item = if stop.is_cancelled() {
            match shard_rx.lock().await.try_recv() {
                Ok(item) => item,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return,
            }
        } else {
            match tokio::time::timeout(POLL_INTERVAL, shard_rx.lock().await.recv()).await {
                Ok(Some(item)) => item,
                Ok(None) => return,
                Err(_) => continue,
            }
        };

        process(item, worker_id, shard_id, &deps).await;
    }
}

async fn process(mut item: QueuedMessage, worker_id: usize, shard_id: usize, deps: &WorkerDeps) {
    let queue_latency = item.queue_latency();
    signalrt_metrics::histogram!(signalrt_metrics::worker::QUEUE_LATENCY_SECONDS)
        .record(queue_latency.as_secs_f64());

    let message = match item.message.take() {
        Some(message) => message,
        None => match signalrt_protocol::parse(&item.raw) {
            Ok(message) => message,
            Err(signalrt_protocol::Error::Unsupported) => {
                debug!(worker_id, shard_id, "dropping unsupported message");
                item.acknowledge();
                return;
            },
            Err(error) => {
                warn!(worker_id, %error, "worker failed to parse frame");
                send_to_dlq(
                    deps.dlq.as_ref(),
                    &item.raw,
                    "parse_failed",
                    json!({"worker_id": worker_id}),
                )
                .await;
                item.acknowledge();
                return;
            },
        },
    };

    dispatch(message, worker_id, shard_id, deps).await;
    signalrt_metrics::counter!(signalrt_metrics::worker::MESSAGES_PROCESSED_TOTAL).increment(1);
    item.acknowledge();
}

async fn dispatch(message: Message, worker_id: usize, shard_id: usize, deps: &WorkerDeps) {
    if is_duplicate(deps.checkpoint.as_ref(), &message.source, message.timestamp).await {
        debug!(
            worker_id,
            shard_id,
            source = %message.source,
            timestamp = message.timestamp,
            "duplicate suppressed"
        );
        signalrt_metrics::counter!(signalrt_metrics::worker::DUPLICATES_SUPPRESSED_TOTAL)
            .increment(1);
        return;
    }

    let recipient = message.recipient().to_string();
    let _guard = deps.locks.lock(&recipient).await;
    dispatch_locked(message, worker_id, shard_id, deps).await;
}

async fn dispatch_locked(message: Message, worker_id: usize, shard_id: usize, deps: &WorkerDeps) {
    let source = message.source.clone();
    let timestamp = message.timestamp;

    if message.kind == MessageKind::Sync && !deps.dispatch_sync_messages {
        debug!(
            worker_id,
            shard_id,
            source = %source,
            timestamp,
            "dropping sync echo (dispatch_sync_messages disabled)"
        );
        mark_checkpoint(deps.checkpoint.as_ref(), &source, timestamp).await;
        return;
    }

    let Some(text) = message.text.clone().filter(|t| !t.is_empty()) else {
        mark_checkpoint(deps.checkpoint.as_ref(), &source, timestamp).await;
        return;
    };

    let router = deps.router.read().await;
    let Some(matched) = router.match_text(&text) else {
        drop(router);
        mark_checkpoint(deps.checkpoint.as_ref(), &source, timestamp).await;
        return;
    };
    if !matched.command.is_allowed(&source) {
        drop(router);
        mark_checkpoint(deps.checkpoint.as_ref(), &source, timestamp).await;
        return;
    }

    let command_name = matched.command.name.clone();
    let trigger = matched.trigger.clone();
    let handler = matched.command.handler.clone();
    drop(router);

    let mut ctx = DispatchContext {
        message,
        command: command_name.clone(),
        trigger: trigger.clone(),
        worker_id,
        shard_id,
        gateway: deps.gateway.clone(),
        own_number: deps.own_number.clone(),
        locks: Some(deps.locks.clone()),
    };

    let middleware = deps.middleware.read().await;
    let result = middleware.execute(&mut ctx, handler.as_ref()).await;
    drop(middleware);

    match result {
        Ok(()) => {
            mark_checkpoint(deps.checkpoint.as_ref(), &source, timestamp).await;
        },
        Err(error) => {
            error!(
                worker_id,
                shard_id,
                command = %command_name,
                trigger = %trigger,
                %error,
                "command handler failed"
            );
            signalrt_metrics::counter!(signalrt_metrics::worker::COMMAND_ERRORS_TOTAL).increment(1);
            send_to_dlq(
                deps.dlq.as_ref(),
                &ctx.message.raw,
                "command_failed",
                json!({
                    "command": command_name,
                    "trigger": trigger,
                    "worker_id": worker_id,
                    "shard_id": shard_id,
                    "source": source,
                    "timestamp": timestamp,
                }),
            )
            .await;
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signalrt_checkpoint::MemoryCheckpointStore;
    use signalrt_dlq::MemoryDlq;
    use signalrt_locks::LockManager;
    use signalrt_router::{Command, CommandHandler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn sample_message(text: &str) -> Message {
        Message {
            id: Uuid::nil(),
            source: "+15550001".into(),
            destination: None,
            timestamp: 1,
            kind: signalrt_protocol::MessageKind::Data,
            text: Some(text.into()),
            group: None,
            mentions: vec![],
            attachments: vec![],
            quote: None,
            reaction: None,
            edit_target: None,
            delete_target: None,
            view_once: false,
            raw: "{}".into(),
        }
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl CommandHandler for CountingHandler {
        async fn handle(&self, _ctx: &mut DispatchContext) -> signalrt_router::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl CommandHandler for FailingHandler {
        async fn handle(&self, _ctx: &mut DispatchContext) -> signalrt_router::Result<()> {
            Err(signalrt_router::Error::Handler("boom".into()))
        }
    }

    async fn deps_with_command(handler: Arc<dyn CommandHandler>) -> Arc<WorkerDeps> {
        let mut deps = WorkerDeps::new()
            .with_checkpoint(Arc::new(MemoryCheckpointStore::with_capacity(100)))
            .with_dlq(Arc::new(MemoryDlq::new()))
            .with_locks(Arc::new(LockManager::new()));
        deps.router
            .get_mut()
            .register(Arc::new(Command::new("ping", handler).with_literal_trigger("!ping")));
        Arc::new(deps)
    }

    #[tokio::test]
    async fn matched_command_executes_and_marks_checkpoint() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = deps_with_command(Arc::new(CountingHandler(calls.clone()))).await;

        dispatch(sample_message("!ping"), 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(
            deps.checkpoint
                .as_ref()
                .unwrap()
                .is_duplicate("+15550001", 1)
                .await
        );
    }

    #[tokio::test]
    async fn unmatched_text_still_marks_checkpoint() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = deps_with_command(Arc::new(CountingHandler(calls.clone()))).await;

        dispatch(sample_message("no command here"), 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(
            deps.checkpoint
                .as_ref()
                .unwrap()
                .is_duplicate("+15550001", 1)
                .await
        );
    }

    #[tokio::test]
    async fn duplicate_message_skips_dispatch_entirely() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = deps_with_command(Arc::new(CountingHandler(calls.clone()))).await;
        deps.checkpoint.as_ref().unwrap().mark_processed("+15550001", 1).await;

        dispatch(sample_message("!ping"), 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failure_dead_letters_and_skips_checkpoint() {
        let deps = deps_with_command(Arc::new(FailingHandler)).await;

        dispatch(sample_message("!ping"), 0, 0, &deps).await;

        assert!(
            !deps
                .checkpoint
                .as_ref()
                .unwrap()
                .is_duplicate("+15550001", 1)
                .await
        );
        let entries = deps.dlq.as_ref().unwrap().inspect().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reason, "command_failed");
    }

    #[tokio::test]
    async fn whitelist_rejection_marks_checkpoint_without_executing_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut deps = WorkerDeps::new().with_checkpoint(Arc::new(MemoryCheckpointStore::with_capacity(100)));
        deps.router.get_mut().register(Arc::new(
            Command::new("ping", Arc::new(CountingHandler(calls.clone())))
                .with_literal_trigger("!ping")
                .with_whitelist(["+admin".to_string()].into_iter().collect()),
        ));
        let deps = Arc::new(deps);

        dispatch(sample_message("!ping"), 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(
            deps.checkpoint
                .as_ref()
                .unwrap()
                .is_duplicate("+15550001", 1)
                .await
        );
    }

    #[tokio::test]
    async fn sync_echo_is_not_dispatched_by_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = deps_with_command(Arc::new(CountingHandler(calls.clone()))).await;

        let mut message = sample_message("!ping");
        message.kind = MessageKind::Sync;
        dispatch(message, 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(
            deps.checkpoint
                .as_ref()
                .unwrap()
                .is_duplicate("+15550001", 1)
                .await
        );
    }

    #[tokio::test]
    async fn sync_echo_dispatches_when_flag_enabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut deps = WorkerDeps::new()
            .with_checkpoint(Arc::new(MemoryCheckpointStore::with_capacity(100)))
            .with_dispatch_sync_messages(true);
        deps.router.get_mut().register(Arc::new(
            Command::new("ping", Arc::new(CountingHandler(calls.clone()))).with_literal_trigger("!ping"),
        ));
        let deps = Arc::new(deps);

        let mut message = sample_message("!ping");
        message.kind = MessageKind::Sync;
        dispatch(message, 0, 0, &deps).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
