use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::ExerciseError;

/// Retry configuration with capped exponential backoff
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the retry that follows failed attempt `attempt` (0-based):
    /// `min(initial * factor^attempt, max)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.initial_delay_ms as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis((delay as u64).min(self.max_delay_ms))
    }

    /// Run `func` until it succeeds, fails with a non-retryable error, runs
    /// out of attempts, or `cancel` fires. Cancellation wins over everything,
    /// including a request or backoff sleep in flight.
    pub async fn execute<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        mut func: F,
    ) -> Result<T, ExerciseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExerciseError>>,
    {
        let mut attempt = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExerciseError::Cancelled),
                result = func() => result,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt + 1 >= self.max_attempts {
                tracing::warn!("Max attempts ({}) exceeded: {}", self.max_attempts, err);
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            tracing::debug!(
                "Attempt {} failed, retrying in {}ms: {}",
                attempt + 1,
                delay.as_millis(),
                err
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExerciseError::Cancelled),
                _ = sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn network_error() -> ExerciseError {
        ExerciseError::Network("connection reset".into())
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_millis(1000));
        assert_eq!(config.delay_for(1), Duration::from_millis(2000));
        assert_eq!(config.delay_for(2), Duration::from_millis(4000));
        assert_eq!(config.delay_for(3), Duration::from_millis(5000));
        assert_eq!(config.delay_for(10), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_on_first_try() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = config
            .execute(&CancellationToken::new(), || {
                let attempts = attempts_clone.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ExerciseError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = config
            .execute(&CancellationToken::new(), || {
                let attempts = attempts_clone.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(network_error())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_max_attempts_exceeded() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = config
            .execute(&CancellationToken::new(), || {
                let attempts = attempts_clone.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(network_error())
                }
            })
            .await;

        assert!(matches!(result, Err(ExerciseError::Network(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = config
            .execute(&CancellationToken::new(), || {
                let attempts = attempts_clone.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(ExerciseError::MissingApiKey)
                }
            })
            .await;

        assert!(matches!(result, Err(ExerciseError::MissingApiKey)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let config = RetryConfig::default();
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let cancel_clone = cancel.clone();

        let result = config
            .execute(&cancel, || {
                let attempts = attempts_clone.clone();
                let cancel = cancel_clone.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    cancel.cancel();
                    Err::<i32, _>(network_error())
                }
            })
            .await;

        assert!(matches!(result, Err(ExerciseError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_runs() {
        let config = RetryConfig::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = config
            .execute(&cancel, || async { Ok::<_, ExerciseError>(1) })
            .await;

        assert!(matches!(result, Err(ExerciseError::Cancelled)));
    }
}
