use std::future::Future;
use std::time::Duration;

use super::github_client::GithubError;

/// How often, and how patiently, a single GitHub call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A policy that makes exactly one attempt.
    #[allow(dead_code)]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, error: &GithubError) -> Duration {
        if let GithubError::RateLimited {
            retry_after: Some(retry_after),
        } = error
        {
            return (*retry_after).min(self.max_delay);
        }

        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a final error, or the attempts
    /// run out. Returns the last error in the latter two cases.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, GithubError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GithubError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt, &err);
                    tracing::debug!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying GitHub request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        tracing::warn!(operation, attempts = attempt, error = %err, "Giving up on GitHub request");
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500), Duration::from_secs(3));
        let err = GithubError::Network("reset".into());

        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2, &err), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3, &err), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4, &err), Duration::from_secs(3));
        assert_eq!(policy.delay_for(40, &err), Duration::from_secs(3));
    }

    #[test]
    fn rate_limit_hint_wins_over_backoff() {
        let policy = RetryPolicy::default();
        let err = GithubError::RateLimited {
            retry_after: Some(Duration::from_secs(4)),
        };
        assert_eq!(policy.delay_for(1, &err), Duration::from_secs(4));

        let long = GithubError::RateLimited {
            retry_after: Some(Duration::from_secs(3600)),
        };
        assert_eq!(policy.delay_for(1, &long), policy.max_delay);
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = instant_policy(3)
            .run("fetch_repos", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(GithubError::Http {
                        status: 503,
                        url: "https://api.github.com/users/octocat/repos".into(),
                    })
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn final_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy(5)
            .run("fetch_user", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GithubError::NotFound("nobody".into()))
            })
            .await;

        assert!(matches!(result, Err(GithubError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn last_error_is_returned_when_attempts_run_out() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy(2)
            .run("fetch_gists", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GithubError::Timeout("10s".into()))
            })
            .await;

        assert!(matches!(result, Err(GithubError::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
