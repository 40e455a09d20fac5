//! Minimum spacing between requests to one remote service

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::time::Duration;

/// Token bucket allowing one request per `spacing`
///
/// A zero spacing disables limiting (used against local mock servers).
pub(crate) struct RequestSpacing {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl RequestSpacing {
    pub(crate) fn new(spacing: Duration) -> Self {
        Self {
            limiter: Quota::with_period(spacing).map(RateLimiter::direct),
        }
    }

    /// Wait until the next request may be sent
    pub(crate) async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
