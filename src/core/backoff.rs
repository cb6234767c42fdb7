// HiveTail - core/backoff.rs
//
// Retry delay after failed poll cycles.
//
// The first failure waits one normal poll interval. Each further consecutive
// failure doubles the wait, capped at `max_delay`. A successful cycle resets
// the failure count, which the poller tracks.

use crate::util::constants;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the next attempt after `consecutive_failures` failures in a
    /// row. Zero failures means the normal `interval`.
    pub fn delay_after(&self, consecutive_failures: u32, interval: Duration) -> Duration {
        if consecutive_failures == 0 {
            return interval;
        }
        // 2^31 already exceeds any sane cap; clamp the exponent so the shift
        // cannot overflow.
        let exponent = (consecutive_failures - 1).min(31);
        let scaled = interval.saturating_mul(1u32 << exponent);
        // A cap below the interval would make failures poll faster than
        // successes.
        scaled.min(self.max_delay.max(interval))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_millis(constants::DEFAULT_MAX_RETRY_DELAY_MS),
        }
    }
}
