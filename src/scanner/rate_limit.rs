//! Per-Plugin Rate Limiting
//!
//! Token-bucket limiter derived from a plugin's declared requests-per-minute
//! budget. The bucket starts full, refills continuously at `rpm / 60` tokens
//! per second, and caps at the per-minute budget. A budget of zero disables
//! throttling entirely.
//!
//! Waiting happens outside the bucket lock, so a throttled task never blocks
//! other tasks (or other scans sharing the limiter) from taking tokens that
//! have already accrued.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by all scans of one plugin
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Build a limiter from a requests-per-minute budget; 0 means unlimited
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = f64::from(requests_per_minute);
        Self {
            capacity,
            refill_per_sec: capacity / 60.0,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0)
    }

    pub fn is_unlimited(&self) -> bool {
        self.capacity == 0.0
    }

    /// Take one token, waiting for refill when the bucket is empty
    ///
    /// Callers must not hold scheduler resources (like a concurrency permit)
    /// across this call; a starved bucket can wait for many seconds.
    pub async fn acquire(&self) {
        if self.is_unlimited() {
            return;
        }

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill);
                state.tokens = (state.tokens + elapsed.as_secs_f64() * self.refill_per_sec)
                    .min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_sec)
            };
            sleep(wait).await;
        }
    }
}
