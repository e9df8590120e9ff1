//! Minimum-spacing request limiter
//!
//! A `governor` GCRA limiter with a burst of one: every admitted request
//! pushes the next free slot one spacing period ahead, and concurrent callers
//! queue behind that single watermark.

use governor::{
    clock::{Clock, DefaultClock, ReasonablyRealtime},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::fmt;
use std::time::Duration;

/// Enforces a minimum gap between dispatched requests
///
/// A zero spacing disables limiting entirely.
pub struct RequestSpacer<C: Clock = DefaultClock> {
    spacing: Duration,
    clock: C,
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>>,
}

impl RequestSpacer {
    pub fn new(spacing: Duration) -> Self {
        Self::with_clock(spacing, DefaultClock::default())
    }
}

impl<C: Clock + Clone> RequestSpacer<C> {
    /// Build a spacer reading time from `clock`
    pub fn with_clock(spacing: Duration, clock: C) -> Self {
        let limiter = Quota::with_period(spacing)
            .map(|quota| RateLimiter::direct_with_clock(quota, clock.clone()));
        Self {
            spacing,
            clock,
            limiter,
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Record a dispatch happening now if the spacing allows it
    ///
    /// # Errors
    ///
    /// Returns the remaining wait when the previous dispatch is too recent;
    /// nothing is recorded in that case.
    pub fn try_dispatch(&self) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

impl<C: ReasonablyRealtime + Clone> RequestSpacer<C> {
    /// Wait until this caller may dispatch, then record the dispatch
    pub async fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        if let Err(wait) = self.try_dispatch() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "Spacing request");
            limiter.until_ready().await;
        }
    }
}

impl<C: Clock> fmt::Debug for RequestSpacer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpacer")
            .field("spacing", &self.spacing)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}
