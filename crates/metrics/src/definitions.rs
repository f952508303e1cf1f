//! Metric name and label definitions.
//!
//! Centralizing these as constants (rather than inlining string literals at
//! each call site) keeps naming consistent between the HTTP core, the
//! listener, and the worker pool. Names are ported from the original
//! `observability/metrics.py` constants (`MESSAGES_PROCESSED`,
//! `MESSAGE_QUEUE_DEPTH`, `MESSAGE_QUEUE_LATENCY`, `ERRORS_OCCURRED`,
//! `API_CLIENT_PERFORMANCE`).

/// HTTP request metrics
pub mod http {
    /// Total number of HTTP requests issued, across all resource clients.
    pub const REQUESTS_TOTAL: &str = "signalrt_http_requests_total";
    /// Duration of a single HTTP attempt in seconds, ported from `API_CLIENT_PERFORMANCE`.
    pub const REQUEST_DURATION_SECONDS: &str = "signalrt_http_request_duration_seconds";
    /// Number of currently in-flight HTTP requests.
    pub const REQUESTS_IN_FLIGHT: &str = "signalrt_http_requests_in_flight";
    /// Requests retried after a transient failure.
    pub const RETRIES_TOTAL: &str = "signalrt_http_retries_total";
    /// Requests that failed after exhausting retries.
    pub const REQUEST_ERRORS_TOTAL: &str = "signalrt_http_request_errors_total";
}

/// WebSocket listener metrics
pub mod websocket {
    /// Total number of WebSocket (re)connections established.
    pub const CONNECTIONS_TOTAL: &str = "signalrt_websocket_connections_total";
    /// Whether the listener currently holds an open connection (0/1).
    pub const CONNECTION_OPEN: &str = "signalrt_websocket_connection_open";
    /// Total number of frames received from the gateway.
    pub const MESSAGES_RECEIVED_TOTAL: &str = "signalrt_websocket_messages_received_total";
    /// Frames dropped by the ingress backpressure policy.
    pub const FRAMES_DROPPED_TOTAL: &str = "signalrt_websocket_frames_dropped_total";
}

/// Worker pool metrics
pub mod worker {
    /// Total number of messages fully processed (dispatched or skipped cleanly).
    pub const MESSAGES_PROCESSED_TOTAL: &str = "signalrt_worker_messages_processed_total";
    /// Combined depth of the ingress queue and all shard queues.
    pub const QUEUE_DEPTH: &str = "signalrt_worker_queue_depth";
    /// Time a message spent queued before a worker picked it up, in seconds.
    pub const QUEUE_LATENCY_SECONDS: &str = "signalrt_worker_queue_latency_seconds";
    /// Messages suppressed by the checkpoint store as duplicates.
    pub const DUPLICATES_SUPPRESSED_TOTAL: &str = "signalrt_worker_duplicates_suppressed_total";
    /// Command handler invocations that raised an error.
    pub const COMMAND_ERRORS_TOTAL: &str = "signalrt_worker_command_errors_total";
}

/// Checkpoint store metrics
pub mod checkpoint {
    /// Dedup lookups performed against the checkpoint store.
    pub const LOOKUPS_TOTAL: &str = "signalrt_checkpoint_lookups_total";
    /// Lookup or mark operations that failed at the storage layer (non-fatal).
    pub const STORE_ERRORS_TOTAL: &str = "signalrt_checkpoint_store_errors_total";
}

/// Dead-letter queue metrics
pub mod dlq {
    /// Entries written to the DLQ, labeled by `reason`.
    pub const ENTRIES_TOTAL: &str = "signalrt_dlq_entries_total";
}

/// Rate limiter and circuit breaker metrics
pub mod resilience {
    /// Time spent waiting on `RateLimiter::acquire`, in seconds.
    pub const RATE_LIMIT_WAIT_SECONDS: &str = "signalrt_rate_limit_wait_seconds";
    /// Circuit breaker state transitions, labeled by `from`/`to`.
    pub const CIRCUIT_TRANSITIONS_TOTAL: &str = "signalrt_circuit_breaker_transitions_total";
    /// Calls rejected outright because the circuit was open.
    pub const CIRCUIT_REJECTIONS_TOTAL: &str = "signalrt_circuit_breaker_rejections_total";
}

/// Config loading metrics
pub mod config {
    /// Config load duration in seconds.
    pub const LOAD_DURATION_SECONDS: &str = "signalrt_config_load_duration_seconds";
    /// Config parse errors by format.
    pub const PARSE_ERRORS_TOTAL: &str = "signalrt_config_parse_errors_total";
    /// Environment substitution failures.
    pub const ENV_SUBSTITUTION_FAILURES_TOTAL: &str =
        "signalrt_config_env_substitution_failures_total";
}

/// Common/shared metrics
pub mod common {
    /// Application errors by type, the catch-all bumped alongside DLQ writes
    /// and swallowed storage errors.
    pub const ERRORS_TOTAL: &str = "signalrt_errors_total";
}

/// Common label keys used across metrics
pub mod labels {
    pub const ENDPOINT: &str = "endpoint";
    pub const METHOD: &str = "method";
    pub const STATUS: &str = "status";
    pub const ERROR_TYPE: &str = "error_type";
    pub const REASON: &str = "reason";
    pub const SHARD_ID: &str = "shard_id";
    pub const WORKER_ID: &str = "worker_id";
    pub const BACKEND: &str = "backend";
    pub const FROM: &str = "from";
    pub const TO: &str = "to";
}

/// Standard histogram buckets for different metric types
pub mod buckets {
    use once_cell::sync::Lazy;

    /// HTTP request duration buckets (in seconds).
    /// Covers 1ms to 60s.
    pub static HTTP_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]
    });

    /// Queue wait/latency buckets (in seconds).
    /// Covers 1ms to 60s.
    pub static QUEUE_LATENCY: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]
    });

    /// Queue depth buckets.
    /// Covers 1 to 10000.
    pub static QUEUE_SIZE: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0, 10000.0,
        ]
    });

    /// Attachment download size buckets (in bytes).
    /// Covers 1KB to 100MB.
    pub static DOWNLOAD_SIZE: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            1024.0, 10240.0, 102400.0, 1048576.0, 10485760.0, 104857600.0,
        ]
    });
}
