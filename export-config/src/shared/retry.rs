use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Retry policy configuration for I/O-bound operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,

    /// Initial delay, in milliseconds, before the first retry.
    pub initial_delay_ms: u64,

    /// Maximum delay between retries.
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier applied to the delay after each attempt.
    pub backoff_factor: f32,

    /// Whether to apply random jitter to each delay.
    pub jitter: bool,
}

impl RetryConfig {
    /// Preset for read-path operations: few attempts, short delays.
    pub fn short() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5_000,
            backoff_factor: 2.0,
            jitter: false,
        }
    }

    /// Preset for write-path and notification operations: more attempts, longer
    /// delays, jittered. Destination writes are rarer and more expensive to
    /// repeat, so they get a higher ceiling than reads.
    pub fn long() -> Self {
        Self {
            max_attempts: 8,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    /// Validates the retry configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::MaxAttemptsZero);
        }
        if self.backoff_factor < 1.0 {
            return Err(ValidationError::InvalidOption {
                key: "backoff_factor",
                reason: "must be >= 1.0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::short()
    }
}
