//! Admission Control Module
//!
//! Global token bucket consulted on the request path before any work is
//! handed to the cache worker.

use std::time::Instant;

use parking_lot::Mutex;

/// Token bucket state
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    capacity: f64,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
            capacity: capacity as f64,
            refill_rate: refill_rate as f64,
        }
    }

    fn try_consume(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

// == Rate Limiter ==
/// Shared request rate limiter.
///
/// A `requests_per_second` of zero disables limiting.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Option<Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// Allows `requests_per_second` on average with bursts up to `burst`.
    pub fn new(requests_per_second: u64, burst: u64) -> Self {
        let bucket = (requests_per_second > 0)
            .then(|| Mutex::new(TokenBucket::new(burst.max(1), requests_per_second)));
        Self { bucket }
    }

    /// A limiter that never throttles.
    pub fn disabled() -> Self {
        Self { bucket: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    // == Is Throttling ==
    /// Takes a token for the current request; true means reject it.
    pub fn is_throttling(&self) -> bool {
        match &self.bucket {
            Some(bucket) => !bucket.lock().try_consume(Instant::now()),
            None => false,
        }
    }
}
