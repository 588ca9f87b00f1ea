//! Retry and backoff decisions for failed request attempts.
//!
//! The policy is a pure decision table: given the attempt number that just
//! failed, the classified error, and the latest quota snapshot, it answers
//! whether to retry and how long to wait first. The facade drives the
//! bounded loop and performs the actual sleeps, keeping the control flow
//! auditable.

use std::time::Duration;

use super::error::{FailureKind, GithubError};
use super::rate_limit::RateLimitSnapshot;

/// Total attempts allowed per logical request (two retries).
const MAX_ATTEMPTS: u32 = 3;

/// First backoff step; doubled for every further attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded exponential-backoff policy for GitHub requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom backoff base, keeping the attempt
    /// ceiling.
    #[must_use]
    pub const fn with_base_delay(base_delay: Duration) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay,
        }
    }

    /// Total attempts allowed per logical request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether the attempt that just failed should be retried.
    ///
    /// `attempt` is 1-based. Returns the delay to sleep before the next
    /// attempt, or `None` when the request must fail with the given error.
    /// When the quota window is exhausted the delay never undercuts the
    /// provider's stated reset time.
    #[must_use]
    pub fn next_delay(
        &self,
        attempt: u32,
        error: &GithubError,
        snapshot: Option<RateLimitSnapshot>,
    ) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        if !is_retryable(error, snapshot) {
            return None;
        }

        let exponential = self.exponential_delay(attempt);
        match snapshot {
            Some(quota) if quota.is_exhausted() => {
                Some(exponential.max(Duration::from_secs(quota.seconds_until_reset())))
            }
            _ => Some(exponential),
        }
    }

    /// Forced wait before the first attempt of any request: when the last
    /// observed snapshot shows an empty window with a future reset, no
    /// attempt may proceed until that reset.
    #[must_use]
    pub fn reset_wait(snapshot: Option<RateLimitSnapshot>) -> Option<Duration> {
        let quota = snapshot?;
        if !quota.is_exhausted() {
            return None;
        }
        let wait = quota.seconds_until_reset();
        (wait > 0).then(|| Duration::from_secs(wait))
    }

    fn exponential_delay(&self, attempt: u32) -> Duration {
        // Cap the exponent so a corrupt attempt counter cannot overflow.
        let doublings = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(2_u32.saturating_pow(doublings))
    }
}

/// Retryability per failure category.
///
/// Forbidden is ambiguous in the provider's API: permission denials and
/// exhausted quotas surface with the same status. Only the quota case is
/// transient, so Forbidden retries require a snapshot showing zero
/// remaining requests.
fn is_retryable(error: &GithubError, snapshot: Option<RateLimitSnapshot>) -> bool {
    match error {
        GithubError::Network { .. } => true,
        GithubError::Api(failure) => match failure.kind {
            FailureKind::ServerError | FailureKind::Timeout => true,
            FailureKind::Forbidden => snapshot.is_some_and(|quota| quota.is_exhausted()),
            FailureKind::Unauthorized
            | FailureKind::NotFound
            | FailureKind::UnprocessableInput
            | FailureKind::Generic => false,
        },
        GithubError::MissingToken | GithubError::Configuration { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use rstest::rstest;

    use super::super::error::{ApiFailure, FailureKind, GithubError};
    use super::super::rate_limit::RateLimitSnapshot;
    use super::RetryPolicy;

    fn classified(kind: FailureKind) -> GithubError {
        GithubError::api(ApiFailure {
            kind,
            status: None,
            status_text: "test".to_owned(),
            message: "test failure".to_owned(),
            documentation_url: None,
            body: None,
        })
    }

    fn now_unix() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_secs()
    }

    #[rstest]
    #[case::unauthorized(FailureKind::Unauthorized)]
    #[case::not_found(FailureKind::NotFound)]
    #[case::unprocessable(FailureKind::UnprocessableInput)]
    #[case::generic(FailureKind::Generic)]
    fn non_transient_kinds_never_retry(#[case] kind: FailureKind) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(1, &classified(kind), None), None);
    }

    #[rstest]
    #[case::server_error(FailureKind::ServerError)]
    #[case::timeout(FailureKind::Timeout)]
    fn transient_kinds_back_off_exponentially(#[case] kind: FailureKind) {
        let policy = RetryPolicy::default();
        let error = classified(kind);

        assert_eq!(
            policy.next_delay(1, &error, None),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            policy.next_delay(2, &error, None),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn attempt_ceiling_stops_retries() {
        let policy = RetryPolicy::default();
        let error = classified(FailureKind::ServerError);

        assert_eq!(policy.next_delay(3, &error, None), None);
    }

    #[test]
    fn unclassified_transport_failures_retry() {
        let policy = RetryPolicy::default();
        let error = GithubError::Network {
            message: "connection reset".to_owned(),
        };

        assert_eq!(
            policy.next_delay(1, &error, None),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn forbidden_retries_only_when_quota_is_exhausted() {
        let policy = RetryPolicy::default();
        let error = classified(FailureKind::Forbidden);

        assert_eq!(policy.next_delay(1, &error, None), None);

        let healthy = RateLimitSnapshot::new(5000, 100, now_unix() + 30, 4900);
        assert_eq!(policy.next_delay(1, &error, Some(healthy)), None);

        let exhausted = RateLimitSnapshot::new(5000, 0, now_unix() + 30, 5000);
        assert!(policy.next_delay(1, &error, Some(exhausted)).is_some());
    }

    #[test]
    fn exhausted_quota_delay_honours_the_reset_time() {
        let policy = RetryPolicy::default();
        let error = classified(FailureKind::ServerError);
        let exhausted = RateLimitSnapshot::new(5000, 0, now_unix() + 30, 5000);

        let delay = policy
            .next_delay(1, &error, Some(exhausted))
            .expect("transient failure should retry");
        assert!(
            delay >= Duration::from_secs(29),
            "delay should cover the reset window, got {delay:?}"
        );
    }

    #[test]
    fn exhausted_quota_delay_keeps_the_exponential_floor() {
        let policy = RetryPolicy::default();
        let error = classified(FailureKind::ServerError);
        let reset_passed = RateLimitSnapshot::new(5000, 0, 0, 5000);

        assert_eq!(
            policy.next_delay(2, &error, Some(reset_passed)),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn reset_wait_applies_only_to_exhausted_future_windows() {
        assert_eq!(RetryPolicy::reset_wait(None), None);

        let healthy = RateLimitSnapshot::new(5000, 42, now_unix() + 30, 4958);
        assert_eq!(RetryPolicy::reset_wait(Some(healthy)), None);

        let reset_passed = RateLimitSnapshot::new(5000, 0, 0, 5000);
        assert_eq!(RetryPolicy::reset_wait(Some(reset_passed)), None);

        let exhausted = RateLimitSnapshot::new(5000, 0, now_unix() + 30, 5000);
        let wait = RetryPolicy::reset_wait(Some(exhausted)).expect("wait should be forced");
        assert!(
            wait >= Duration::from_secs(29),
            "wait should reach the reset, got {wait:?}"
        );
    }

    #[test]
    fn custom_base_delay_scales_the_backoff() {
        let policy = RetryPolicy::with_base_delay(Duration::from_millis(10));
        let error = classified(FailureKind::ServerError);

        assert_eq!(
            policy.next_delay(2, &error, None),
            Some(Duration::from_millis(20))
        );
    }
}
