use crate::error::ApiError;
use backoff::{ExponentialBackoff, backoff::Backoff};
use std::future::Future;
use std::time::Duration;

/// Retry policy for idempotent API reads
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short delays, used by tests and interactive commands
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 1.5,
        }
    }

    /// Single attempt
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Server faults and timeouts are transient; every other failure is final
pub fn is_transient(error: &ApiError) -> bool {
    match error {
        ApiError::Timeout { .. } => true,
        ApiError::Http { status, .. } => *status == 0 || (500..=599).contains(status),
        ApiError::UnexpectedStatus { actual, .. } => (500..=599).contains(actual),
        ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } | ApiError::NotFound { .. } => {
            false
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of attempts
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_delay,
            max_interval: self.config.max_delay,
            multiplier: self.config.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            if !is_transient(&error) {
                return Err(error);
            }
            if attempt >= self.config.max_attempts {
                log::warn!("Giving up after {} attempts: {}", attempt, error);
                return Err(error);
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    log::debug!("Retrying after {:?} (attempt {}): {}", delay, attempt, error);
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            }
        }
    }
}

/// Retry with the default policy
pub async fn with_retry<F, Fut, T>(operation: F) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    RetryExecutor::default().execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> ApiError {
        ApiError::Http {
            status: 503,
            endpoint: "/members".to_string(),
            message: "unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_is_immediate() {
        let result = with_retry(|| async { Ok::<i32, ApiError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryConfig::quick());

        let counter = Arc::clone(&calls);
        let result = executor
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(server_error())
                    } else {
                        Ok("members")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "members");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryConfig::quick());

        let counter = Arc::clone(&calls);
        let result: Result<(), ApiError> = executor
            .execute(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auth_failures_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), ApiError> = with_retry(|| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ApiError::Forbidden {
                    endpoint: "/roles".to_string(),
                    server_message: "no".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&server_error()));
        assert!(is_transient(&ApiError::Timeout {
            timeout_secs: 5,
            endpoint: "/members".to_string(),
        }));
        assert!(!is_transient(&ApiError::NotFound {
            endpoint: "/members/1".to_string(),
        }));
        assert!(!is_transient(&ApiError::Http {
            status: 422,
            endpoint: "/members".to_string(),
            message: "bad".to_string(),
        }));
        assert_eq!(RetryConfig::none().max_attempts, 1);
    }
}
