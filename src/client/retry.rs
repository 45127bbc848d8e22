//! Retry budget and backoff schedule for a single chat call.

use std::time::Duration;

/// Configuration for retry logic.
///
/// `max_attempts` counts the first try, so the default of 3 means one call plus
/// two retries. Every failure kind shares this one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    pub fn with_min_delay(mut self, d: Duration) -> Self {
        self.min_delay = d;
        self
    }

    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// No waiting between attempts. Handy for tests and local mocks.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to sleep after `failed_attempt` (1-based) before trying again.
    ///
    /// Returns `None` once the attempt budget is spent. The wait doubles from
    /// `min_delay` and is clamped to `max_delay`: 1s, 2s, 4s, 8s, 10s, 10s...
    pub fn delay_after(&self, failed_attempt: u32) -> Option<Duration> {
        if failed_attempt >= self.max_attempts {
            return None;
        }
        let base = self.min_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;

        // exponential backoff: min_delay * 2^(attempt-1)
        let shift = failed_attempt.saturating_sub(1);
        let factor = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
        let delay = base.saturating_mul(factor).max(base).min(cap);
        Some(Duration::from_millis(delay))
    }
}
