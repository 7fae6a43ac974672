//! Shared failure taxonomy and retry policy for remote service calls.
//!
//! Source and destination adapters surface every wire-level failure as a
//! [`RemoteError`] so services can pattern-match on the category instead of
//! inspecting HTTP minutiae. [`RetryPolicy`] wraps an async operation with
//! capped exponential backoff for the retryable category.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Result type for remote adapter operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Categorized failure from a remote service call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Transient failure (timeout, 5xx, rate limit); safe to retry.
    #[error("retryable remote failure: {0}")]
    Retryable(String),

    /// Non-retryable upstream rejection (validation, malformed request).
    #[error("permanent remote failure: {0}")]
    Permanent(String),

    /// Credential rejection; surfaced to the operator, never retried.
    #[error("authentication failure: {0}")]
    Auth(String),

    /// The requested remote entity does not exist.
    #[error("remote entity not found")]
    NotFound,
}

impl RemoteError {
    /// Returns `true` when the failure is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// Capped exponential backoff policy for retryable remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

/// Upper bound on a single backoff sleep regardless of attempt count.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

impl RetryPolicy {
    /// Creates a policy retrying up to `max_attempts` times with the given
    /// base delay. A `max_attempts` of zero is treated as one attempt.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
        }
    }

    /// Returns the configured attempt ceiling.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff delay for the given zero-based attempt index.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Runs `operation`, retrying on [`RemoteError::Retryable`] with
    /// exponential backoff until the attempt ceiling is reached.
    ///
    /// # Errors
    ///
    /// Returns the last [`RemoteError::Retryable`] after exhausting
    /// attempts, and any other [`RemoteError`] immediately.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> RemoteResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tracing::debug!(attempt, error = %err, "retrying remote call");
                    tokio::time::sleep(self.delay_for(attempt - 1)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteError, RetryPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn retryable_failures_are_retried_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run(|| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(RemoteError::Retryable("flaky".to_owned()))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn the_last_retryable_error_surfaces_after_exhaustion() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let result: Result<(), _> = policy
            .run(|| async { Err(RemoteError::Retryable("down".to_owned())) })
            .await;
        assert_eq!(result, Err(RemoteError::Retryable("down".to_owned())));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn permanent_failures_are_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::Permanent("bad request".to_owned())) }
            })
            .await;

        assert_eq!(result, Err(RemoteError::Permanent("bad request".to_owned())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(250));
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.delay_for(20), Duration::from_secs(30));
    }
}
