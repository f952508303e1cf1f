//! Shared HTTP core (C1): a single client underlying every Signal REST
//! resource client, implementing spec.md §4.3's request pipeline —
//! header composition, timeout resolution, rate limiting, circuit
//! breaking, JSON/raw-bytes responses, structured error classification,
//! and exponential-backoff retries.

mod circuit_breaker;
mod client;
mod error;
mod error_codes;
mod rate_limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::{Body, ClientConfig, HeaderProvider, HttpClient, RequestOptions};
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use rate_limiter::{NoopRateLimiter, RateLimiter, TokenBucketRateLimiter};
