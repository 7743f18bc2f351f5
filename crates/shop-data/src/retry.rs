//! Retry budget for idempotent reads.

use std::time::Duration;

use crate::{FetchError, Response};

const BASE_DELAY: Duration = Duration::from_millis(200);
const MAX_DELAY: Duration = Duration::from_secs(2);

/// How often a read is re-sent after a transient failure.
///
/// A 5xx status, a timeout or a connection failure is transient; any other
/// outcome is returned as is. The delay doubles per retry up to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Retry a read up to `max_retries` times.
    pub fn reads(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::reads(0)
    }

    /// Retry immediately, without waiting.
    pub fn without_backoff(mut self) -> Self {
        self.base_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Whether the outcome of attempt `attempt` should be retried.
    pub fn should_retry(&self, result: &Result<Response, FetchError>, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        match result {
            Ok(resp) => (500..600).contains(&resp.status),
            Err(err) => is_transient(err),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::reads(1)
    }
}

fn is_transient(error: &FetchError) -> bool {
    matches!(
        error,
        FetchError::Timeout | FetchError::Connection(_) | FetchError::RequestError(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_is_capped() {
        let policy = RetryPolicy::reads(3);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(2));
        assert_eq!(policy.without_backoff().delay_for_attempt(3), Duration::ZERO);
    }

    #[test]
    fn test_server_errors_are_retried_within_budget() {
        let policy = RetryPolicy::reads(2);
        let busy = Ok(Response::with_text(503, "busy"));
        assert!(policy.should_retry(&busy, 0));
        assert!(policy.should_retry(&busy, 1));
        assert!(!policy.should_retry(&busy, 2));
        assert!(!policy.should_retry(&Ok(Response::with_text(404, "")), 0));
        assert!(!policy.should_retry(&Ok(Response::with_text(429, "")), 0));
    }

    #[test]
    fn test_only_transient_errors_are_retried() {
        let policy = RetryPolicy::reads(1);
        assert!(policy.should_retry(&Err(FetchError::Timeout), 0));
        assert!(policy.should_retry(&Err(FetchError::Connection("reset".into())), 0));
        assert!(!policy.should_retry(&Err(FetchError::ParseError("x".into())), 0));
        assert!(!RetryPolicy::none().should_retry(&Err(FetchError::Timeout), 0));
    }
}
