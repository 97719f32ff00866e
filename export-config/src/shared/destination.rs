use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration options for supported export destinations.
///
/// Variants correspond to the supported sinks. Concrete cloud storage SDKs sit
/// behind the same destination seam and would appear here as further variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationConfig {
    /// In-memory destination for ephemeral or test data.
    Memory,
    /// Local filesystem destination.
    Fs {
        /// Root directory under which artifacts are written.
        root: String,
    },
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl DestinationConfig {
    /// Validates the destination configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Memory => Ok(()),
            Self::Fs { root } => {
                if root.is_empty() {
                    return Err(ValidationError::InvalidOption {
                        key: "root",
                        reason: "must not be empty".to_string(),
                    });
                }

                Ok(())
            }
        }
    }
}
