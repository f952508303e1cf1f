//! Minimal ping/pong bot, ported from `examples/ping_bot.py` in the
//! original implementation: registers one command and starts the
//! runtime.

use std::sync::Arc;

use async_trait::async_trait;
use signalrt_gateway::Registrar;
use signalrt_router::{Command, CommandHandler, DispatchContext};
use signalrt_worker::WorkerPool;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    async fn handle(&self, ctx: &mut DispatchContext) -> signalrt_router::Result<()> {
        ctx.reply("pong").await
    }
}

struct PingBotRegistrar;

#[async_trait]
impl Registrar for PingBotRegistrar {
    async fn register(&self, pool: &WorkerPool) {
        pool.register(Arc::new(
            Command::new("ping", Arc::new(Ping)).with_literal_trigger("!ping"),
        ))
        .await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new("info").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = signalrt_config::discover_and_load();
    signalrt_gateway::bootstrap_with(config, Some(Arc::new(PingBotRegistrar))).await
}
