use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration options for supported record sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// In-memory source for ephemeral or test data.
    Memory,
    /// JSON-lines file source.
    File {
        /// Path to the JSON-lines file to read.
        path: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl SourceConfig {
    /// Validates the source configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Memory => Ok(()),
            Self::File { path } => {
                if path.is_empty() {
                    return Err(ValidationError::InvalidOption {
                        key: "path",
                        reason: "must not be empty".to_string(),
                    });
                }

                Ok(())
            }
        }
    }
}
