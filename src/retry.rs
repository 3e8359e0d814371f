/*!
 * Retry logic with exponential backoff
 */

use rand::Rng;
use std::thread;
use std::time::Duration;

use crate::config::{BackoffStrategy, RetrySettings};
use crate::error::Result;

/// Retry policy for catalog requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_attempts: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff strategy to use
    pub backoff: BackoffStrategy,

    /// Jitter factor (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff: settings.backoff,
            jitter_factor: settings.jitter_factor,
        }
    }
}

impl RetryPolicy {
    /// A policy that fails on the first error
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// Calculate delay for a given retry number (1-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let base_delay = match self.backoff {
            BackoffStrategy::Linear => self.initial_delay.saturating_mul(attempt),
            BackoffStrategy::Exponential | BackoffStrategy::ExponentialWithJitter => {
                let multiplier = 2_u32.saturating_pow(attempt - 1);
                self.initial_delay.saturating_mul(multiplier)
            }
            BackoffStrategy::Fixed => self.initial_delay,
        };

        let capped_delay = base_delay.min(self.max_delay);

        if matches!(self.backoff, BackoffStrategy::ExponentialWithJitter) && self.jitter_factor > 0.0
        {
            let jitter = rand::rng().random_range(0.0..self.jitter_factor);
            let jitter_amount = capped_delay.as_secs_f64() * jitter;
            capped_delay + Duration::from_secs_f64(jitter_amount)
        } else {
            capped_delay
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out
pub fn with_retry<T, F>(policy: &RetryPolicy, operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= policy.max_attempts => {
                tracing::error!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = %e,
                    "Giving up after transient failures"
                );
                return Err(e);
            }
            Err(e) => {
                tracing::debug!(operation = operation_name, error = %e, "Transient failure");
                attempt += 1;

                let delay = policy.calculate_delay(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after transient failure"
                );
                thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineageError;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff: BackoffStrategy::Fixed,
            jitter_factor: 0.0,
        }
    }

    #[test]
    fn test_exponential_delay() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff: BackoffStrategy::Exponential,
            ..Default::default()
        };
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(4), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff: BackoffStrategy::Exponential,
            ..Default::default()
        };
        assert_eq!(policy.calculate_delay(10), Duration::from_secs(5));
    }

    #[test]
    fn test_linear_and_fixed_delay() {
        let linear = RetryPolicy {
            initial_delay: Duration::from_millis(50),
            backoff: BackoffStrategy::Linear,
            ..Default::default()
        };
        assert_eq!(linear.calculate_delay(3), Duration::from_millis(150));

        let fixed = RetryPolicy {
            initial_delay: Duration::from_millis(50),
            backoff: BackoffStrategy::Fixed,
            ..Default::default()
        };
        assert_eq!(fixed.calculate_delay(7), Duration::from_millis(50));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff: BackoffStrategy::ExponentialWithJitter,
            jitter_factor: 0.5,
            ..Default::default()
        };
        for _ in 0..20 {
            let delay = policy.calculate_delay(2);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay < Duration::from_millis(300));
        }
    }

    #[test]
    fn test_transient_error_retries() {
        let mut attempts = 0;
        let result: Result<()> = with_retry(&quick(3), "test", || {
            attempts += 1;
            Err(LineageError::transport("connection reset"))
        });

        assert!(matches!(result, Err(LineageError::Transport { .. })));
        // initial + 3 retries
        assert_eq!(attempts, 4);
    }

    #[test]
    fn test_permanent_error_no_retry() {
        let mut attempts = 0;
        let result: Result<()> = with_retry(&quick(10), "test", || {
            attempts += 1;
            Err(LineageError::Auth("rejected".to_string()))
        });

        assert!(matches!(result, Err(LineageError::Auth(_))));
        assert_eq!(attempts, 1, "Permanent error triggered retries!");
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let mut attempts = 0;
        let result = with_retry(&quick(3), "test", || {
            attempts += 1;
            if attempts < 3 {
                Err(LineageError::Transport {
                    message: "unavailable".to_string(),
                    status: Some(503),
                })
            } else {
                Ok(attempts)
            }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_none_policy_single_attempt() {
        let mut attempts = 0;
        let _: Result<()> = with_retry(&RetryPolicy::none(), "test", || {
            attempts += 1;
            Err(LineageError::transport("timeout"))
        });
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let mut attempts = 0;
        let result: Result<()> = with_retry(&quick(2), "test", || {
            attempts += 1;
            Err(LineageError::Transport {
                message: format!("attempt {}", attempts),
                status: Some(502),
            })
        });

        match result {
            Err(LineageError::Transport { message, .. }) => assert_eq!(message, "attempt 3"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
