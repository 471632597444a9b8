//! Retry classification and exponential backoff

use std::time::Duration;

/// Decides which failures are retried and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Wait after the first failed attempt; doubles each retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait before the attempt following `failed_attempt` (1-based)
    ///
    /// `base * 2^(failed_attempt - 1)`, saturating instead of overflowing.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(failed_attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Returns true if another attempt is allowed after `failed_attempt`
    pub fn allows_retry(&self, failed_attempt: u32) -> bool {
        failed_attempt < self.max_attempts
    }

    /// Every backoff wait a URL that never succeeds would go through
    #[cfg(test)]
    fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.backoff(a)).collect()
    }
}

/// Rate-limit and server-error responses are transient; everything else is final
///
/// | Status | Action |
/// |--------|--------|
/// | 429 | Retry with backoff |
/// | 5xx | Retry with backoff |
/// | 404, other 4xx | Fail immediately |
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
