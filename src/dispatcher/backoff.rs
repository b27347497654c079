use std::time::Duration;

/// Delay schedule between model attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the second attempt; doubles per attempt after that.
    pub base: Duration,
    pub ceiling: Duration,
    /// Extra wait after a rate-limited attempt.
    pub rate_limit_base: Duration,
    /// Added to `rate_limit_base` once per attempt already made.
    pub rate_limit_step: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            ceiling: Duration::from_millis(5000),
            rate_limit_base: Duration::from_millis(2000),
            rate_limit_step: Duration::from_millis(1000),
        }
    }
}

impl BackoffPolicy {
    /// No waiting at all.
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            ceiling: Duration::ZERO,
            rate_limit_base: Duration::ZERO,
            rate_limit_step: Duration::ZERO,
        }
    }

    /// Wait before `attempt` (0-based). The first attempt never waits.
    pub fn retry_delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 1).min(31) as u32;
        self.base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.ceiling)
            .min(self.ceiling)
    }

    /// Wait after `attempt` (0-based) was rejected as rate limited.
    pub fn rate_limit_delay(&self, attempt: usize) -> Duration {
        let step = self
            .rate_limit_step
            .checked_mul(attempt.min(u32::MAX as usize) as u32)
            .unwrap_or(Duration::MAX);
        self.rate_limit_base.saturating_add(step)
    }
}
