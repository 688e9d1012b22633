//! RetryPolicy - How hard the Repository tries before giving up

use core::time::Duration;

/// Bounded retry configuration for single-item fetches
///
/// A fetch makes at most `max_retries + 1` upstream calls and waits
/// `backoff_delay` between consecutive attempts. The delay is fixed;
/// there is no exponential growth or jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 2;
    pub const DEFAULT_BACKOFF_DELAY: Duration = Duration::from_millis(100);

    /// Create a new RetryPolicy
    pub const fn new(max_retries: u32, backoff_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff_delay,
        }
    }

    /// A single attempt, never waits
    pub const fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Builder: set max retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builder: set backoff delay
    pub fn with_backoff_delay(mut self, backoff_delay: Duration) -> Self {
        self.backoff_delay = backoff_delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_delay(&self) -> Duration {
        self.backoff_delay
    }

    /// Upper bound on upstream calls for one fetch
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_BACKOFF_DELAY)
    }
}
