use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Batch size cannot be zero.
    #[error("`batch_size` cannot be zero")]
    BatchSizeZero,

    /// Retry attempts cannot be zero.
    #[error("`max_attempts` cannot be zero")]
    MaxAttemptsZero,

    /// An option value failed validation.
    #[error("invalid option `{key}`: {reason}")]
    InvalidOption {
        /// The offending option key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required option has no explicit value and its environment fallback is unset.
    #[error("missing required option `{key}` (no value supplied and `{env}` is not set)")]
    MissingOption {
        /// The offending option key.
        key: &'static str,
        /// The environment variable consulted as a fallback.
        env: &'static str,
    },
}

/// Resolves an option with an environment-variable fallback.
///
/// Precedence is explicit value > environment variable. Callers layer their own
/// default (or a [`ValidationError::MissingOption`] for required options) on top.
pub fn resolve_env_fallback(explicit: Option<String>, env_name: &str) -> Option<String> {
    explicit.or_else(|| std::env::var(env_name).ok())
}

/// Resolves a required option, erroring when neither an explicit value nor the
/// environment fallback is available.
pub fn require_option(
    explicit: Option<String>,
    key: &'static str,
    env_name: &'static str,
) -> Result<String, ValidationError> {
    resolve_env_fallback(explicit, env_name).ok_or(ValidationError::MissingOption {
        key,
        env: env_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_value_wins_over_environment() {
        unsafe { std::env::set_var("EXPORT_TEST_FALLBACK_A", "from-env") };
        let resolved = resolve_env_fallback(Some("explicit".to_string()), "EXPORT_TEST_FALLBACK_A");
        assert_eq!(resolved.as_deref(), Some("explicit"));
    }

    #[test]
    fn environment_fills_missing_value() {
        unsafe { std::env::set_var("EXPORT_TEST_FALLBACK_B", "from-env") };
        let resolved = resolve_env_fallback(None, "EXPORT_TEST_FALLBACK_B");
        assert_eq!(resolved.as_deref(), Some("from-env"));
    }

    #[test]
    fn missing_required_option_is_an_error() {
        let result = require_option(None, "access_key", "EXPORT_TEST_FALLBACK_UNSET");
        assert!(matches!(
            result,
            Err(ValidationError::MissingOption {
                key: "access_key",
                ..
            })
        ));
    }
}
