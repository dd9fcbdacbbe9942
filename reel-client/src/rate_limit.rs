//! Outbound request pacing

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Gate every outbound vendor call passes through
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Suspends until another request may be issued
    async fn acquire(&self);
}

/// Spaces successive `acquire()` returns by at least a fixed interval
#[derive(Debug)]
pub struct MinIntervalLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl MinIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for MinIntervalLimiter {
    async fn acquire(&self) {
        // Held across the sleep so waiters are served one at a time
        let mut next_slot = self.next_slot.lock().await;

        if let Some(slot) = *next_slot {
            tokio::time::sleep_until(slot).await;
        }

        *next_slot = Some(Instant::now() + self.interval);
    }
}
