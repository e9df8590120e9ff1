//! Retry utilities for resilient operations
//!
//! A small retry helper with linear or exponential backoff. The season
//! aggregator uses it with linear steps; the gateway computes its own 429
//! backoff because `Retry-After` can override it.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Growth of the delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (total attempts = max_retries + 1)
    pub max_retries: u32,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps growth)
    pub max_delay_ms: u64,

    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff: Backoff::Exponential,
        }
    }
}

impl RetryConfig {
    /// Linear backoff: `step_ms`, `2 * step_ms`, ...
    pub fn linear(max_retries: u32, step_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms: step_ms,
            max_delay_ms: u64::MAX,
            backoff: Backoff::Linear,
        }
    }

    /// Exponential backoff capped at `max_delay_ms`
    pub fn exponential(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            backoff: Backoff::Exponential,
        }
    }

    /// Delay before the given attempt (attempt 0 runs immediately)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            match self.backoff {
                Backoff::Linear => self.base_delay_ms.saturating_mul(u64::from(attempt)),
                Backoff::Exponential => {
                    let factor = 2_u64.checked_pow(attempt - 1).unwrap_or(u64::MAX);
                    self.base_delay_ms.saturating_mul(factor)
                }
            }
            .min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Execute an operation with retry logic
///
/// Returns the first success, or the last error once every attempt failed.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    E: Display,
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "Retrying operation after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if attempt >= config.max_retries => {
                warn!(
                    attempts = attempt + 1,
                    error = %e,
                    "Operation failed, retries exhausted"
                );
                return Err(e);
            }
            Err(e) => {
                debug!(
                    attempt = attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    "Operation failed"
                );
            }
        }

        attempt += 1;
    }
}
