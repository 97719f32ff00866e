//! Bounded exponential backoff for I/O-bound operations.
//!
//! Two policies are distinguished by expected operation cost: a short policy for
//! read-path operations and a long policy for write-path and notification
//! operations. Only errors classified as transient are retried; after exhausting
//! the configured attempts the last error is returned unchanged so callers see
//! the original failure kind.

use std::future::Future;
use std::time::Duration;

use export_config::shared::RetryConfig;
use rand::Rng;
use tracing::warn;

use crate::error::ExportResult;

/// Executes operations with bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a retry policy from the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Policy for read-path operations: few attempts, short delays.
    pub fn short() -> Self {
        Self::new(RetryConfig::short())
    }

    /// Policy for write-path and notification operations: more attempts, longer
    /// delays, jittered.
    pub fn long() -> Self {
        Self::new(RetryConfig::long())
    }

    /// Runs `operation` until it succeeds, fails with a non-transient error, or
    /// the attempt budget is exhausted.
    ///
    /// Retry waits block only the calling task. The last error is returned
    /// unchanged on exhaustion.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> ExportResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ExportResult<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.kind().is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, retrying: {err}"
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }

        unreachable!("the retry loop always returns within the attempt budget")
    }

    /// Returns the backoff delay for the given 1-based attempt number.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay = self.config.initial_delay_ms as f64
            * (self.config.backoff_factor as f64).powi(exponent as i32);
        let delay = delay.min(self.config.max_delay_ms as f64).max(0.0) as u64;

        let delay = if self.config.jitter && delay > 1 {
            // Half-jitter: keep at least half the deterministic delay so backoff
            // still grows, randomize the rest to avoid synchronized retries.
            let half = delay / 2;
            half + rand::thread_rng().gen_range(0..=half)
        } else {
            delay
        };

        Duration::from_millis(delay)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use export_config::shared::RetryConfig;

    use super::*;
    use crate::error::{ErrorKind, ExportError};
    use crate::export_error;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_factor: 2.0,
            jitter: false,
        })
    }

    #[tokio::test]
    async fn recovers_within_attempt_ceiling() {
        let attempts = AtomicU32::new(0);

        let result = fast_policy(3)
            .execute("fetch", || async {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(export_error!(ErrorKind::SourceIoError, "Broker blip"))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn reraises_original_error_after_exhaustion() {
        let attempts = AtomicU32::new(0);

        let result: ExportResult<()> = fast_policy(3)
            .execute("fetch", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(export_error!(
                    ErrorKind::SourceIoError,
                    "Broker blip",
                    "connection reset"
                ))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceIoError);
        assert_eq!(err.detail(), Some("connection reset"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let attempts = AtomicU32::new(0);

        let result: ExportResult<()> = fast_policy(5)
            .execute("fetch", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(export_error!(ErrorKind::ConfigError, "Bad option"))
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::ConfigError);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 10,
            initial_delay_ms: 100,
            max_delay_ms: 400,
            backoff_factor: 2.0,
            jitter: false,
        });

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(8), Duration::from_millis(400));
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_factor: 2.0,
            jitter: true,
        });

        for _ in 0..50 {
            let delay = policy.delay_for_attempt(2).as_millis() as u64;
            assert!((100..=200).contains(&delay));
        }
    }
}
