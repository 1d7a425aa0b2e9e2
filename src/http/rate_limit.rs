//! Request pacing
//!
//! AppSync throttles per API, so one limiter is shared by every POST the
//! client makes: list pages, single-record reads and each step of a bulk
//! mutation alike.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Sustained rate and burst allowance
///
/// ```yaml
/// rate_limit:
///   per_second: 25
///   burst: 50
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Requests allowed per second once the burst is spent
    pub per_second: u32,
    /// Requests that may go out back to back; defaults to `per_second`
    pub burst: Option<u32>,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst: None,
        }
    }
}

impl RateLimiterConfig {
    /// Steady rate with the burst equal to it
    pub fn per_second(per_second: u32) -> Self {
        Self {
            per_second,
            burst: None,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    fn quota(&self) -> Quota {
        // A zero rate would never admit anything; treat it as one
        let rate = NonZeroU32::new(self.per_second).unwrap_or(NonZeroU32::MIN);
        let burst = self
            .burst
            .and_then(NonZeroU32::new)
            .unwrap_or(rate);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Governor<NotKeyed, InMemoryState, DefaultClock>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Governor::direct(config.quota())),
            config: *config,
        }
    }

    /// Suspend until the bucket admits one more request
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("per_second", &self.config.per_second)
            .field("burst", &self.config.burst)
            .finish()
    }
}
