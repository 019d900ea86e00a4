//! Token-bucket rate limiter.
//!
//! Tokens accrue at `refill_rate` per second up to `capacity`; each request
//! takes one. A non-positive `refill_rate` disables limiting.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Maximum burst size.
    pub capacity: f64,
    /// Tokens added per second.
    pub refill_rate: f64,
}

impl RateLimiterConfig {
    /// `rps` requests per second with a burst of the same size.
    pub fn per_second(rps: f64) -> Self {
        Self {
            capacity: rps.max(1.0),
            refill_rate: rps,
        }
    }

    /// No limiting.
    pub fn unlimited() -> Self {
        Self {
            capacity: 1.0,
            refill_rate: 0.0,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.refill_rate <= 0.0
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(25.0)
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Thread-safe token bucket.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: config.capacity,
                last_refill: Instant::now(),
            }),
            config,
        }
    }

    /// Take a token if one is available.
    pub fn try_acquire(&self) -> bool {
        if self.config.is_unlimited() {
            return true;
        }
        let mut bucket = self.lock();
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Estimated wait until a token is available.
    pub fn wait_time(&self) -> Duration {
        if self.config.is_unlimited() {
            return Duration::ZERO;
        }
        let mut bucket = self.lock();
        self.refill(&mut bucket);
        let deficit = 1.0 - bucket.tokens;
        if deficit <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(deficit / self.config.refill_rate)
        }
    }

    /// Wait until a token is available, then take it.
    pub async fn acquire(&self) {
        while !self.try_acquire() {
            let wait = self.wait_time().max(Duration::from_millis(1));
            tracing::trace!(wait_ms = wait.as_millis() as u64, "rate limited, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Bucket> {
        // Bucket is plain data; a poisoned lock is still usable.
        self.bucket.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.config.refill_rate).min(self.config.capacity);
        bucket.last_refill = now;
    }
}
