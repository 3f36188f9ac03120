//! Throttling between consecutive API calls

use std::time::Duration;

/// Called by the aggregator between keywords
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug {
    /// Wait until the next request may be sent
    async fn pause(&self);
}

/// Sleep for the same interval after every keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait::async_trait]
impl RateLimiter for FixedInterval {
    async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        log::debug!("Waiting {}ms before next keyword", self.interval.as_millis());
        tokio::time::sleep(self.interval).await;
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait::async_trait]
impl RateLimiter for NoDelay {
    async fn pause(&self) {}
}
