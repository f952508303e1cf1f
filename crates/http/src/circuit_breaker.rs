//! Circuit breaker (C10), `{Closed, Open, HalfOpen}` per spec.md §4.4.
//!
//! Grounded on `crates/agents/src/provider_chain.rs::ProviderState`
//! (consecutive-failure counter + cooldown timer), generalized from an
//! implicit two-state skip/don't-skip flag into the full three-state
//! machine the spec requires, with an explicit `HalfOpen` probe slot so
//! only one caller tests the downstream while the rest see `Open`.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Per-key circuit state. One breaker instance can guard several
/// distinct keys (e.g. endpoint paths) — state is per-key so one
/// flaky endpoint doesn't trip calls to an unrelated one.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    states: Mutex<std::collections::HashMap<String, KeyState>>,
}

struct KeyState {
    consecutive_failures: AtomicU32,
    opened_at: AtomicU64,
    /// Whether a half-open probe is currently in flight for this key.
    probing: std::sync::atomic::AtomicBool,
}

impl KeyState {
    fn new() -> Self {
        Self {
            consecutive_failures: AtomicU32::new(0),
            opened_at: AtomicU64::new(0),
            probing: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            states: Mutex::new(std::collections::HashMap::new()),
        }
    }

    fn state_for(&self, key: &str) -> CircuitState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let Some(state) = states.get(key) else {
            return CircuitState::Closed;
        };
        let opened_at = state.opened_at.load(Ordering::SeqCst);
        if opened_at == 0 {
            return CircuitState::Closed;
        }
        let elapsed_ms = now_ms().saturating_sub(opened_at);
        if elapsed_ms >= self.config.cooldown.as_millis() as u64 {
            CircuitState::HalfOpen
        } else {
            CircuitState::Open
        }
    }

    /// Current state for `key`, for metrics/introspection.
    #[must_use]
    pub fn state(&self, key: &str) -> CircuitState {
        self.state_for(key)
    }

    /// Guard a call: if the circuit is open, reject without invoking
    /// `f`. In `HalfOpen`, only one probe is let through at a time;
    /// concurrent callers are rejected until the probe resolves.
    pub async fn guard<F, Fut, T>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        match self.state_for(key) {
            CircuitState::Open => return Err(Error::CircuitOpen(key.to_string())),
            CircuitState::HalfOpen => {
                if !self.try_start_probe(key) {
                    return Err(Error::CircuitOpen(key.to_string()));
                }
            },
            CircuitState::Closed => {},
        }

        let result = f().await;
        match &result {
            Ok(_) => self.record_success(key),
            Err(err) if err.is_transient() => self.record_failure(key),
            Err(_) => {},
        }
        self.end_probe(key);
        result
    }

    fn try_start_probe(&self, key: &str) -> bool {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let Some(state) = states.get(key) else {
            return true;
        };
        state
            .probing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn end_probe(&self, key: &str) {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = states.get(key) {
            state.probing.store(false, Ordering::SeqCst);
        }
    }

    fn record_success(&self, key: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(key.to_string()).or_insert_with(KeyState::new);
        state.consecutive_failures.store(0, Ordering::SeqCst);
        state.opened_at.store(0, Ordering::SeqCst);
    }

    fn record_failure(&self, key: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(key.to_string()).or_insert_with(KeyState::new);
        let failures = state.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.config.failure_threshold {
            state.opened_at.store(now_ms(), Ordering::SeqCst);
        }
    }
}

fn now_ms() -> u64 {
    // Monotonic, not wall-clock: only used for cooldown arithmetic within
    // a single process lifetime.
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let start = *START.get_or_init(Instant::now);
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ApiErrorKind};

    fn server_error() -> Error {
        Error::Api(ApiError {
            kind: ApiErrorKind::Server,
            message: "boom".into(),
            status: 500,
            body: String::new(),
            docs_url: String::new(),
        })
    }

    #[tokio::test]
    async fn stays_closed_below_threshold() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        });
        for _ in 0..2 {
            let _ = cb
                .guard("ep", || async { Err::<(), _>(server_error()) })
                .await;
        }
        assert_eq!(cb.state("ep"), CircuitState::Closed);
    }

    #[tokio::test]
    async fn opens_after_threshold_and_rejects() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown: Duration::from_secs(30),
        });
        for _ in 0..2 {
            let _ = cb
                .guard("ep", || async { Err::<(), _>(server_error()) })
                .await;
        }
        assert_eq!(cb.state("ep"), CircuitState::Open);

        let result = cb.guard("ep", || async { Ok::<_, Error>(()) }).await;
        assert!(matches!(result, Err(Error::CircuitOpen(_))));
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown: Duration::from_secs(30),
        });
        let _ = cb
            .guard("ep", || async { Err::<(), _>(server_error()) })
            .await;
        let _ = cb.guard("ep", || async { Ok::<_, Error>(()) }).await;
        assert_eq!(cb.state("ep"), CircuitState::Closed);

        let _ = cb
            .guard("ep", || async { Err::<(), _>(server_error()) })
            .await;
        assert_eq!(cb.state("ep"), CircuitState::Closed);
    }

    #[tokio::test]
    async fn distinct_keys_have_independent_state() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::from_secs(30),
        });
        let _ = cb
            .guard("a", || async { Err::<(), _>(server_error()) })
            .await;
        assert_eq!(cb.state("a"), CircuitState::Open);
        assert_eq!(cb.state("b"), CircuitState::Closed);
    }
}
