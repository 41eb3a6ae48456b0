use std::time::Duration;

/// Retry/backoff policy shared by every call site that talks to a flaky
/// collaborator
///
/// `max_attempts` counts the first try: 3 attempts means one call plus two
/// retries. Backoff doubles per completed attempt (base * 2^attempt), capped
/// so a misconfigured base cannot stall a request for minutes. Retries are
/// sequential; the caller sleeps between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(10),
        }
    }

    /// Backoff to sleep after the given zero-based attempt fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 2u32.saturating_pow(attempt.min(16));
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }

    /// Whether another attempt remains after the given zero-based attempt.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}
