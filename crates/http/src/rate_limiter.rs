//! Client-side rate limiter (C10), guarding outbound calls before any
//! network I/O (spec.md §4.3 step 3).
//!
//! Generalizes the teacher's fixed-window request throttle
//! (`crates/gateway/src/request_throttle.rs`, used for *inbound* abuse
//! protection) into a refilling token bucket whose `acquire()` suspends
//! the caller rather than rejecting — the spec's contract is "block
//! until a permit is granted", not "reject over budget".

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Suspend until a permit is available.
    async fn acquire(&self);
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter: `rate` tokens accumulate per second, capped at
/// `burst`. `acquire()` takes one token, sleeping first if none are
/// available.
pub struct TokenBucketRateLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

impl TokenBucketRateLimiter {
    #[must_use]
    pub fn new(rate: f64, burst: u32) -> Self {
        let burst = f64::from(burst).max(1.0);
        Self {
            rate: rate.max(0.001),
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Refill the bucket based on elapsed time, then try to take one
    /// token. Returns `None` on success, or `Some(wait)` — how long the
    /// caller should sleep before retrying.
    fn try_acquire(&self) -> Option<Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            None
        } else {
            let deficit = 1.0 - bucket.tokens;
            Some(Duration::from_secs_f64(deficit / self.rate))
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucketRateLimiter {
    async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                None => return,
                Some(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

/// A limiter that never waits, for tests and for config with rate
/// limiting disabled.
pub struct NoopRateLimiter;

#[async_trait]
impl RateLimiter for NoopRateLimiter {
    async fn acquire(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn burst_permits_are_granted_immediately() {
        let limiter = TokenBucketRateLimiter::new(1.0, 3);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn exceeding_burst_suspends_until_refill() {
        let limiter = Arc::new(TokenBucketRateLimiter::new(10.0, 1));
        limiter.acquire().await;

        let limiter2 = limiter.clone();
        let handle = tokio::spawn(async move {
            limiter2.acquire().await;
        });
        tokio::time::advance(Duration::from_millis(150)).await;
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn noop_limiter_never_waits() {
        let limiter = NoopRateLimiter;
        let start = Instant::now();
        for _ in 0..1000 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
