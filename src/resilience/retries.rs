//! Retry policy for the protected operation.
//!
//! # Responsibilities
//! - Hold the attempt budget and backoff schedule as configuration
//! - Decide whether another attempt is allowed after a retryable failure
//!
//! # Design Decisions
//! - Only failures and timeouts are retried; invalid requests never are
//! - `max_attempts` counts the first attempt (3 = one call + two retries)

use std::time::Duration;

use crate::config::{JitterStrategy, RetryConfig};
use crate::resilience::backoff::calculate_backoff;

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff_rate: f64,
    pub max_delay: Option<Duration>,
    pub jitter: JitterStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            interval: Duration::from_millis(config.interval_ms),
            backoff_rate: config.backoff_rate,
            max_delay: config.max_delay_ms.map(Duration::from_millis),
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait before attempt number `attempt` (1-based); zero for the first.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt.saturating_sub(1),
            self.interval,
            self.backoff_rate,
            self.max_delay,
            self.jitter,
        )
    }

    /// The full schedule of waits between attempts, without jitter.
    pub fn schedule(&self) -> Vec<Duration> {
        (2..=self.max_attempts)
            .map(|attempt| {
                calculate_backoff(
                    attempt - 1,
                    self.interval,
                    self.backoff_rate,
                    self.max_delay,
                    JitterStrategy::None,
                )
            })
            .collect()
    }
}
