//! The `SignalrtConfig` schema: all recognized keys from spec.md §6,
//! loaded with `#[serde(deny_unknown_fields)]` at the root so typos are
//! caught at startup, and `#[serde(default)]` on every sub-struct so a
//! partial config file still loads.

use serde::{Deserialize, Serialize};

/// Storage backend selector for the checkpoint store and DLQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    #[default]
    InMemory,
    Sqlite,
    Redis,
}

/// Backpressure policy applied to the listener's bounded ingress queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackpressurePolicy {
    #[default]
    #[serde(rename = "DROP_NEWEST")]
    DropNewest,
    #[serde(rename = "BLOCK")]
    Block,
    #[serde(rename = "DROP_OLDEST")]
    DropOldest,
}

/// `storage.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: StorageType,
    pub sqlite_db: String,
    pub redis_host: String,
    pub redis_port: u16,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageType::InMemory,
            sqlite_db: "signalrt.db".to_string(),
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
        }
    }
}

/// `http.rate_limit.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Sustained permits granted per second.
    pub rate: f64,
    /// Maximum permits that can accumulate for a burst.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: 10.0,
            burst: 20,
        }
    }
}

/// `http.circuit_breaker.*` keys.
///
/// Defaults of 5 consecutive failures / 30s cooldown split the
/// difference between the teacher's 3-failure/60s breaker
/// (`provider_chain.rs`) and the spec's "conservative defaults" hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_seconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_seconds: 30,
        }
    }
}

/// `http.*` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub retries: u32,
    pub backoff_factor: f64,
    pub timeout_seconds: u64,
    /// Path-prefix → per-endpoint timeout override, in seconds. The
    /// longest matching prefix wins (a deliberate refinement over the
    /// original's insertion-order `startswith` scan; see DESIGN.md).
    pub endpoint_timeouts: std::collections::BTreeMap<String, u64>,
    pub rate_limit: RateLimitConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub idempotency_header_name: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_factor: 0.5,
            timeout_seconds: 30,
            endpoint_timeouts: std::collections::BTreeMap::new(),
            rate_limit: RateLimitConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            idempotency_header_name: "Idempotency-Key".to_string(),
        }
    }
}

/// Root configuration for the signalrt runtime.
///
/// Unknown top-level keys are rejected so a typo in a config file fails
/// fast at startup rather than silently doing nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalrtConfig {
    pub phone_number: String,
    /// `host:port` of the signal-cli REST service's WebSocket endpoint.
    pub signal_service: String,
    /// HTTP root for the REST gateway.
    pub base_url: String,
    pub worker_pool_size: usize,
    pub shard_count: usize,
    pub queue_size: usize,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub backpressure: BackpressurePolicy,
    /// Whether `type=SYNC` messages (echoes from the user's own linked
    /// devices) should be dispatched through the command router.
    pub dispatch_sync_messages: bool,
}

impl Default for SignalrtConfig {
    fn default() -> Self {
        Self {
            phone_number: String::new(),
            signal_service: "127.0.0.1:8080".to_string(),
            base_url: "http://127.0.0.1:8080".to_string(),
            worker_pool_size: 4,
            shard_count: 4,
            queue_size: 1000,
            storage: StorageConfig::default(),
            http: HttpConfig::default(),
            backpressure: BackpressurePolicy::default(),
            dispatch_sync_messages: false,
        }
    }
}
