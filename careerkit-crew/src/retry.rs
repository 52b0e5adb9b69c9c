//! Bounded retry with exponential backoff around a single provider call.

use careerkit_error::{Error, Result};
use careerkit_llm::ProviderError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts per stage, including the first. 1 disables retrying.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

/// The last provider error once the policy gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    pub error: ProviderError,
    pub attempts: u32,
}

impl RetryFailure {
    /// True when the error was retryable but we ran out of attempts
    pub fn exhausted(&self) -> bool {
        self.error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 500,
            multiplier: 2.0,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 || self.max_attempts > Self::MAX_ATTEMPTS_LIMIT {
            return Err(Error::config_invalid(format!(
                "retry.max_attempts must be between 1 and {}",
                Self::MAX_ATTEMPTS_LIMIT
            ))
            .with_context("max_attempts", self.max_attempts.to_string()));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(Error::config_invalid("retry.multiplier must be >= 1.0")
                .with_context("multiplier", self.multiplier.to_string()));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(Error::config_invalid(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms",
            ));
        }
        Ok(())
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(32) as i32;
        let millis = (self.initial_backoff_ms as f64) * self.multiplier.powi(exp);
        Duration::from_millis(millis.min(self.max_backoff_ms as f64) as u64)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. A `Retry-After` hint from a
    /// rate-limited response is honoured up to `max_backoff_ms`.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> std::result::Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    let mut delay = self.backoff(attempt);
                    if let ProviderError::RateLimited { retry_after: Some(secs) } = &error {
                        delay = delay
                            .max(Duration::from_secs(*secs))
                            .min(Duration::from_millis(self.max_backoff_ms));
                    }
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(RetryFailure { error, attempts: attempt }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 100,
            multiplier: 2.0,
            max_backoff_ms: 300,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(300));
        assert_eq!(policy.backoff(9), Duration::from_millis(300));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryPolicy::default().with_max_attempts(0).validate().is_err());
        assert!(RetryPolicy::default().with_max_attempts(11).validate().is_err());

        let policy = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_by_default() {
        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), _> = RetryPolicy::default()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProviderError::Network("reset".into())) }
            })
            .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert!(failure.exhausted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let policy = RetryPolicy::default().with_max_attempts(3);
        let result = policy
            .run(|attempt| async move {
                if attempt < 3 {
                    Err(ProviderError::RateLimited { retry_after: Some(1) })
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default().with_max_attempts(4);
        let result: std::result::Result<(), _> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProviderError::AuthenticationFailed) }
            })
            .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.error, ProviderError::AuthenticationFailed);
        assert!(!failure.exhausted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
