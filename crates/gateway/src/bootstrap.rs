//! Wires every crate in the workspace into a running bot process,
//! mirroring `signal_client/bot.py::SignalBot.start`/`container.py`'s
//! DI container: one `HttpClient`, one `WorkerPool`, one
//! `WebSocketListener`, started together and torn down on Ctrl+C.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use signalrt_config::{BackpressurePolicy as ConfigBackpressurePolicy, SignalrtConfig, StorageType};
use signalrt_http::{CircuitBreaker, CircuitBreakerConfig, ClientConfig, HttpClient, TokenBucketRateLimiter};
use signalrt_listener::{BackpressurePolicy, ListenerService, WebSocketListener};
use signalrt_locks::LockManager;
use signalrt_protocol::QueuedMessage;
use signalrt_worker::{WorkerDeps, WorkerPool, WorkerPoolConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::clients::GatewayClients;

fn map_backpressure(policy: ConfigBackpressurePolicy) -> BackpressurePolicy {
    match policy {
        ConfigBackpressurePolicy::DropNewest => BackpressurePolicy::DropNewest,
        ConfigBackpressurePolicy::Block => BackpressurePolicy::Block,
        ConfigBackpressurePolicy::DropOldest => BackpressurePolicy::DropOldest,
    }
}

fn build_http_client(config: &SignalrtConfig) -> HttpClient {
    let endpoint_timeouts = config
        .http
        .endpoint_timeouts
        .iter()
        .map(|(prefix, secs)| (prefix.clone(), Duration::from_secs(*secs)))
        .collect::<BTreeMap<_, _>>();

    let rate_limiter = TokenBucketRateLimiter::new(config.http.rate_limit.rate, config.http.rate_limit.burst);
    let circuit_breaker = CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: config.http.circuit_breaker.failure_threshold,
        cooldown: Duration::from_secs(config.http.circuit_breaker.cooldown_seconds),
    });

    HttpClient::new(ClientConfig {
        base_url: config.base_url.clone(),
        retries: config.http.retries,
        backoff_factor: config.http.backoff_factor,
        timeout: Duration::from_secs(config.http.timeout_seconds),
        rate_limiter: Some(Arc::new(rate_limiter)),
        circuit_breaker: Some(Arc::new(circuit_breaker)),
        default_headers: Vec::new(),
        header_provider: None,
        endpoint_timeouts,
        idempotency_header_name: config.http.idempotency_header_name.clone(),
    })
}

async fn build_checkpoint(config: &SignalrtConfig) -> anyhow::Result<Arc<dyn signalrt_checkpoint::CheckpointStore>> {
    Ok(match config.storage.kind {
        StorageType::Sqlite => {
            Arc::new(signalrt_checkpoint::SqliteCheckpointStore::connect(&config.storage.sqlite_db).await?)
        },
        StorageType::Redis => {
            Arc::new(signalrt_checkpoint::RedisCheckpointStore::connect(&config.storage.redis_host, config.storage.redis_port).await?)
        },
        StorageType::InMemory => Arc::new(signalrt_checkpoint::MemoryCheckpointStore::new()),
    })
}

async fn build_dlq(config: &SignalrtConfig) -> anyhow::Result<Arc<dyn signalrt_dlq::DeadLetterQueue>> {
    Ok(match config.storage.kind {
        StorageType::Sqlite => Arc::new(signalrt_dlq::SqliteDlq::connect(&config.storage.sqlite_db).await?),
        StorageType::InMemory | StorageType::Redis => Arc::new(signalrt_dlq::MemoryDlq::new()),
    })
}

/// Registration hook for the binary embedding this crate (a demo bot,
/// a custom deployment) to add commands/middleware before the pool
/// starts accepting traffic. See `demos/` for a populated example.
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, pool: &WorkerPool);
}

/// Build every runtime component from `config`, then run until Ctrl+C.
/// No commands are registered — a valid but silent bot. Use
/// [`bootstrap_with`] to wire in command handlers and middleware.
pub async fn bootstrap(config: SignalrtConfig) -> anyhow::Result<()> {
    bootstrap_with(config, None).await
}

/// Same as [`bootstrap`] but lets the caller register commands and
/// middleware on the pool before it starts accepting traffic.
pub async fn bootstrap_with(config: SignalrtConfig, registrar: Option<Arc<dyn Registrar>>) -> anyhow::Result<()> {
    let http = build_http_client(&config);
    let gateway: Arc<GatewayClients> = Arc::new(GatewayClients::new(http, config.phone_number.clone()));

    let checkpoint = build_checkpoint(&config).await?;
    let dlq = build_dlq(&config).await?;
    let locks = Arc::new(LockManager::new());

    let deps = WorkerDeps::new()
        .with_checkpoint(checkpoint)
        .with_dlq(dlq)
        .with_locks(locks)
        .with_gateway(gateway.clone())
        .with_own_number(config.phone_number.clone())
        .with_dispatch_sync_messages(config.dispatch_sync_messages);

    let pool_config = WorkerPoolConfig::new(config.worker_pool_size, config.queue_size)
        .with_shard_count(config.shard_count);
    let pool = Arc::new(WorkerPool::with_deps(pool_config, deps));

    if let Some(registrar) = registrar {
        registrar.register(&pool).await;
    }

    pool.start().await;

    let listener_service = Arc::new(ListenerService::new(config.queue_size, map_backpressure(config.backpressure)));
    let ws_url = format!("ws://{}/v1/receive/{}", config.signal_service, config.phone_number);
    let listener = Arc::new(WebSocketListener::new(ws_url));
    let listener_stop = CancellationToken::new();

    let listener_task = tokio::spawn({
        let listener = listener.clone();
        let service = listener_service.clone();
        let stop = listener_stop.clone();
        async move {
            listener.run(&service, stop).await;
        }
    });

    let glue_task = tokio::spawn({
        let service = listener_service.clone();
        let stop = listener_stop.clone();
        let ingress = pool.ingress();
        async move {
            loop {
                match service.recv_timeout(Duration::from_secs(1)).await {
                    Some(raw) => {
                        if ingress.send(QueuedMessage::new(raw, None, None)).await.is_err() {
                            break;
                        }
                    },
                    None => {
                        if stop.is_cancelled() {
                            break;
                        }
                    },
                }
            }
        }
    });

    info!(phone_number = %config.phone_number, "signalrt bot runtime started");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining");

    listener_stop.cancel();
    listener_service.close();
    pool.stop();

    let _ = listener_task.await;
    let _ = glue_task.await;
    pool.join().await;

    Ok(())
}
