//! Middleware chain executor (§4.7): a chain of responsibility over a
//! command dispatch, composed as nested continuations so that a
//! middleware can short-circuit by never invoking `next`.

use std::sync::Arc;

use async_trait::async_trait;
use signalrt_locks::LockManager;
use signalrt_protocol::Message;

use crate::command::CommandHandler;

/// The send-side surface a dispatch needs, implemented by
/// `signalrt-gateway`'s `GatewayClients` bundle. Defined here rather
/// than depending on the gateway crate directly, so router stays a
/// leaf the gateway and worker crates can both build on without a
/// cycle.
#[async_trait]
pub trait OutboundGateway: Send + Sync {
    async fn send_text(&self, recipient: &str, text: &str) -> crate::Result<()>;

    async fn react(
        &self,
        recipient: &str,
        target_author: &str,
        target_timestamp: i64,
        emoji: &str,
    ) -> crate::Result<()>;
}

/// Per-dispatch state threaded through the middleware chain and the
/// final command handler. Middleware may mutate `reply` or any other
/// field before calling `next`.
pub struct DispatchContext {
    pub message: Message,
    pub command: String,
    pub trigger: String,
    pub worker_id: usize,
    pub shard_id: usize,
    pub gateway: Option<Arc<dyn OutboundGateway>>,
    pub own_number: Option<Arc<str>>,
    pub locks: Option<Arc<LockManager>>,
}

impl DispatchContext {
    /// Where a reply to this message should land: the group it arrived
    /// on, or the logical 1:1 chat (accounting for sync echoes) when
    /// `own_number` is known, falling back to the raw source otherwise.
    fn reply_target(&self) -> String {
        match &self.own_number {
            Some(own_number) => self.message.target_chat(own_number),
            None => self.message.recipient().to_string(),
        }
    }

    /// Send `text` back to the sender of the inbound message (or the
    /// group it arrived on).
    pub async fn reply(&self, text: &str) -> crate::Result<()> {
        self.send(&self.reply_target(), text).await
    }

    /// Send `text` to an arbitrary recipient, not necessarily the one
    /// the inbound message came from.
    pub async fn send(&self, recipient: &str, text: &str) -> crate::Result<()> {
        let gateway = self.gateway.as_ref().ok_or(crate::Error::NoGateway)?;
        gateway.send_text(recipient, text).await
    }

    /// React to the inbound message with `emoji`.
    pub async fn react(&self, emoji: &str) -> crate::Result<()> {
        let gateway = self.gateway.as_ref().ok_or(crate::Error::NoGateway)?;
        gateway
            .react(&self.reply_target(), &self.message.source, self.message.timestamp, emoji)
            .await
    }
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> crate::Result<()>;
}

/// The remaining portion of the chain. Consumed by value so a middleware
/// can call it at most once; dropping it without calling `run` silently
/// short-circuits the chain.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    handler: &'a dyn CommandHandler,
}

impl<'a> Next<'a> {
    pub async fn run(self, ctx: &mut DispatchContext) -> crate::Result<()> {
        match self.remaining.split_first() {
            Some((mw, rest)) => {
                let next = Next {
                    remaining: rest,
                    handler: self.handler,
                };
                mw.handle(ctx, next).await
            }
            None => self.handler.handle(ctx).await,
        }
    }
}

/// An ordered, identity-deduped list of middlewares shared across all
/// dispatches on the worker pool.
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, middleware: Arc<dyn Middleware>) {
        if self
            .middlewares
            .iter()
            .any(|m| Arc::ptr_eq(m, &middleware))
        {
            return;
        }
        self.middlewares.push(middleware);
    }

    /// Run the chain, ending in `handler`.
    pub async fn execute(
        &self,
        ctx: &mut DispatchContext,
        handler: &dyn CommandHandler,
    ) -> crate::Result<()> {
        let next = Next {
            remaining: &self.middlewares,
            handler,
        };
        next.run(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalrt_protocol::MessageKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn ctx() -> DispatchContext {
        DispatchContext {
            message: Message {
                id: Uuid::nil(),
                source: "+1".into(),
                destination: None,
                timestamp: 1,
                kind: MessageKind::Data,
                text: Some("!ping".into()),
                group: None,
                mentions: vec![],
                attachments: vec![],
                quote: None,
                reaction: None,
                edit_target: None,
                delete_target: None,
                view_once: false,
                raw: String::new(),
            },
            command: "ping".into(),
            trigger: "!ping".into(),
            worker_id: 0,
            shard_id: 0,
            gateway: None,
            own_number: None,
            locks: None,
        }
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl CommandHandler for CountingHandler {
        async fn handle(&self, _ctx: &mut DispatchContext) -> crate::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct PassThrough(Arc<AtomicUsize>);

    #[async_trait]
    impl Middleware for PassThrough {
        async fn handle(&self, ctx: &mut DispatchContext, next: Next<'_>) -> crate::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(ctx).await
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn handle(&self, _ctx: &mut DispatchContext, _next: Next<'_>) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn chain_invokes_handler_when_all_middlewares_call_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let mut chain = MiddlewareChain::new();
        chain.register(Arc::new(PassThrough(calls.clone())));
        chain.register(Arc::new(PassThrough(calls.clone())));
        let handler = CountingHandler(handler_calls.clone());

        chain.execute(&mut ctx(), &handler).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_circuit_prevents_handler_and_later_middleware() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let mut chain = MiddlewareChain::new();
        chain.register(Arc::new(ShortCircuit));
        chain.register(Arc::new(PassThrough(calls.clone())));
        let handler = CountingHandler(handler_calls.clone());

        chain.execute(&mut ctx(), &handler).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_registration_by_identity_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mw: Arc<dyn Middleware> = Arc::new(PassThrough(calls.clone()));
        let mut chain = MiddlewareChain::new();
        chain.register(mw.clone());
        chain.register(mw);
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler(handler_calls);

        chain.execute(&mut ctx(), &handler).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reply_without_gateway_configured_errors() {
        let err = ctx().reply("pong").await.unwrap_err();
        assert!(matches!(err, crate::Error::NoGateway));
    }

    struct RecordingGateway(Arc<std::sync::Mutex<Vec<(String, String)>>>);

    #[async_trait]
    impl OutboundGateway for RecordingGateway {
        async fn send_text(&self, recipient: &str, text: &str) -> crate::Result<()> {
            self.0.lock().unwrap().push((recipient.to_string(), text.to_string()));
            Ok(())
        }

        async fn react(&self, _recipient: &str, _author: &str, _timestamp: i64, _emoji: &str) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn reply_sends_to_recipient_via_gateway() {
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut c = ctx();
        c.gateway = Some(Arc::new(RecordingGateway(sent.clone())));

        c.reply("pong").await.unwrap();

        assert_eq!(sent.lock().unwrap().as_slice(), &[("+1".to_string(), "pong".to_string())]);
    }
}
