use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;

use crate::errors::Error;

/// Predicate classifying one attempt's outcome; returning `true` means
/// "treat as failure, retry". Invoked with the raw transport outcome, so a
/// custom check must handle the `Err` side as well as any response status.
pub type RetryCheck = Arc<dyn Fn(Result<&Response, &Error>) -> bool + Send + Sync>;

/// Default classification: retry only on transport-level errors. Any
/// delivered response, 5xx included, counts as success unless a custom
/// check says otherwise.
pub fn default_check(outcome: Result<&Response, &Error>) -> bool {
    outcome.is_err()
}

/// The kind of backoff applied between attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryKind {
    #[default]
    None,
    Fixed,
    Exponential,
}

/// Backoff configuration for repeated attempts of one logical request.
#[derive(Clone)]
pub struct RetryPolicy {
    pub kind: RetryKind,
    pub interval: Duration,
    pub max_retries: u32,
    check: RetryCheck,
}

impl RetryPolicy {
    pub fn new(kind: RetryKind, interval: Duration, max_retries: u32, check: RetryCheck) -> Self {
        Self {
            kind,
            interval,
            max_retries,
            check,
        }
    }

    /// Policy performing a single attempt and no retries.
    pub fn none() -> Self {
        Self {
            kind: RetryKind::None,
            interval: Duration::ZERO,
            max_retries: 0,
            check: Arc::new(default_check),
        }
    }

    /// Wait before the i-th retry, `i` starting at 0. Exponential growth is
    /// `interval * 2^i`, unbounded: no cap and no jitter.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        match self.kind {
            RetryKind::None => Duration::ZERO,
            RetryKind::Fixed => self.interval,
            RetryKind::Exponential => self.interval.mul_f64((retry as f64).exp2()),
        }
    }

    pub fn should_retry(&self, outcome: Result<&Response, &Error>) -> bool {
        (self.check)(outcome)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("kind", &self.kind)
            .field("interval", &self.interval)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Immutable description of how one logical request is executed: the retry
/// policy, an optional per-attempt deadline, and an optional delay after
/// which a second parallel attempt sequence is raced against the first.
///
/// Each executing branch receives its own clone, so concurrent branches
/// never observe another branch's policy state.
#[derive(Clone, Debug)]
pub struct ExecutionPlan {
    pub(crate) retry: RetryPolicy,
    pub(crate) attempt_timeout: Option<Duration>,
    pub(crate) race_delay: Option<Duration>,
}

impl ExecutionPlan {
    pub(crate) fn new() -> Self {
        Self {
            retry: RetryPolicy::none(),
            attempt_timeout: None,
            race_delay: None,
        }
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout
    }

    pub fn race_delay(&self) -> Option<Duration> {
        self.race_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(kind: RetryKind, interval_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            kind,
            Duration::from_millis(interval_ms),
            3,
            Arc::new(default_check),
        )
    }

    #[test]
    fn fixed_delay_is_constant_across_retries() {
        let policy = policy(RetryKind::Fixed, 25);
        for i in 0..8 {
            assert_eq!(policy.delay_for_retry(i), Duration::from_millis(25));
        }
    }

    #[test]
    fn exponential_delay_doubles_each_retry() {
        let policy = policy(RetryKind::Exponential, 10);
        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(80));
        // No cap: keeps doubling well past anything reasonable.
        assert_eq!(policy.delay_for_retry(10), Duration::from_millis(10 * 1024));
    }

    #[test]
    fn none_policy_never_waits() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.delay_for_retry(0), Duration::ZERO);
        assert_eq!(policy.max_retries, 0);
    }

    #[test]
    fn default_check_retries_errors_only() {
        assert!(default_check(Err(&Error::Cancelled)));

        let resp = reqwest::Response::from(
            http::Response::builder()
                .status(500)
                .body("upstream sad")
                .unwrap(),
        );
        assert!(!default_check(Ok(&resp)));
    }
}
