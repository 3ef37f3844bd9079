use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::LookupError;

/// Fixed exponential backoff for provider HTTP retries: up to
/// `max_attempts` attempts, waiting `2^attempt` seconds between them
/// (1s, 2s, 4s for the default three attempts). Retry only on transport
/// errors or HTTP 5xx/timeout; a 4xx terminates the attempt immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Backoff before the (0-indexed) `attempt`'th retry: `2^attempt` seconds.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }

    /// Run `operation` up to `max_attempts` times, sleeping with exponential
    /// backoff between retryable failures. Returns the last error once
    /// attempts are exhausted or as soon as a non-retryable error occurs.
    pub async fn run<F, Fut, T>(&self, provider: &str, mut operation: F) -> Result<T, LookupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LookupError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    debug!(provider, attempt, "retryable lookup error, backing off");
                    last_error = Some(error);

                    if attempt + 1 < self.max_attempts {
                        tokio::time::sleep(self.backoff_for_attempt(attempt)).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error.expect("loop runs at least once when max_attempts > 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_without_retry_on_first_try() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = policy
            .run("Orion", move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, LookupError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_succeeds() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = policy
            .run("Orion", move || {
                let calls = calls_clone.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(LookupError::ServerError {
                            provider: "Orion".to_string(),
                            status: 503,
                        })
                    } else {
                        Ok(99)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), LookupError> = policy
            .run("Orion", move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(LookupError::ClientError {
                        provider: "Orion".to_string(),
                        status: 404,
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_returns_last_error() {
        let policy = RetryPolicy::new(3);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), LookupError> = policy
            .run("Orion", move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(LookupError::Timeout {
                        provider: "Orion".to_string(),
                        timeout_ms: 10_000,
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
