//! Bounded retry with exponential backoff for fallible async operations.
//!
//! [`with_retry`] wraps any operation returning a `Result` future — chunk
//! summarization and final synthesis both go through it. Every failure is
//! treated identically by the loop: there is no retryable/fatal distinction
//! at this layer, only a bounded attempt budget. Backoff waits use
//! `tokio::time::sleep`, so a retrying task never blocks its siblings.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Attempt budget and backoff base for one retried operation.
///
/// `max_retries` counts retries after the initial attempt, so an operation is
/// invoked at most `max_retries + 1` times. Before retry `n` (1-based) the
/// loop sleeps `base_delay * 2^(n-1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry count and backoff base.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total number of invocations the policy allows.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Backoff duration before the given 1-based retry number.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

/// Terminal failure of a retried operation: the budget is spent.
///
/// Carries the last error and the number of attempts actually made, which the
/// dispatcher records on the chunk outcome.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub last_error: E,
    /// Total invocations performed (initial attempt included).
    pub attempts: u32,
}

impl<E: Display> Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "operation failed after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

/// Runs `op` until it succeeds or the policy's budget is spent.
///
/// `op` is invoked freshly for each attempt. On failure with retries
/// remaining, the loop sleeps the policy's exponential backoff and tries
/// again; once the budget is spent the last error is returned together with
/// the attempt count.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) if attempt <= policy.max_retries => {
                let wait = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    wait_secs = wait.as_secs_f64(),
                    error = %err,
                    "attempt failed, backing off before retry"
                );
                tokio::time::sleep(wait).await;
            }
            Err(err) => {
                tracing::error!(attempts = attempt, error = %err, "all retry attempts exhausted");
                return Err(RetryExhausted {
                    last_error: err,
                    attempts: attempt,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_immediately_without_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<&str, RetryExhausted<String>> =
            with_retry(RetryPolicy::new(2, Duration::from_secs(5)), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("ok")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_k_times_then_succeeds_invokes_k_plus_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_retry(RetryPolicy::new(2, Duration::from_secs(5)), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= 2 {
                    Err(format!("failure {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_is_invoked_max_attempts_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), _> =
            with_retry(RetryPolicy::new(2, Duration::from_secs(5)), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("always broken".to_string())
                }
            })
            .await;
        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, "always broken");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_retries() {
        let start = Instant::now();
        let result: Result<(), _> =
            with_retry(RetryPolicy::new(2, Duration::from_secs(5)), || async {
                Err("nope".to_string())
            })
            .await;
        assert!(result.is_err());
        // Paused time: 5s before retry 1, 10s before retry 2.
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[test]
    fn backoff_schedule_is_exponential() {
        let policy = RetryPolicy::new(4, Duration::from_secs(5));
        assert_eq!(policy.backoff(1), Duration::from_secs(5));
        assert_eq!(policy.backoff(2), Duration::from_secs(10));
        assert_eq!(policy.backoff(3), Duration::from_secs(20));
        assert_eq!(policy.max_attempts(), 5);
    }
}
