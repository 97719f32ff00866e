use serde::{Deserialize, Serialize};

use crate::shared::{RetryConfig, ValidationError};

/// Configuration for an export pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// The unique identifier for this pipeline.
    ///
    /// A pipeline id determines isolation between pipelines in terms of
    /// checkpoint storage and logging.
    pub id: u64,

    /// Human-readable job name rendered into artifact keys and notifications.
    pub job_name: String,

    /// Maximum number of records requested from the source per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Whether to resume reading from the persisted checkpoint.
    ///
    /// When `false`, reading restarts from the source's natural beginning.
    /// Resuming is the right default for recurring jobs.
    #[serde(default = "default_resume_from_checkpoint")]
    pub resume_from_checkpoint: bool,

    /// Prefix under which all artifacts of this pipeline are written.
    #[serde(default = "default_filebase")]
    pub filebase: String,

    /// Field paths (dot-notation for nested fields) used to partition output.
    ///
    /// Empty means no grouping: all records go to a single default artifact.
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Retry policy for read-path operations.
    #[serde(default = "RetryConfig::short")]
    pub read_retry: RetryConfig,

    /// Retry policy for write-path and notification operations.
    #[serde(default = "RetryConfig::long")]
    pub write_retry: RetryConfig,
}

fn default_batch_size() -> usize {
    1000
}

fn default_resume_from_checkpoint() -> bool {
    true
}

fn default_filebase() -> String {
    "export".to_string()
}

impl PipelineConfig {
    /// Validates the pipeline configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::BatchSizeZero);
        }
        if self.job_name.is_empty() {
            return Err(ValidationError::InvalidOption {
                key: "job_name",
                reason: "must not be empty".to_string(),
            });
        }
        for path in &self.group_by {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(ValidationError::InvalidOption {
                    key: "group_by",
                    reason: format!("`{path}` is not a valid field path"),
                });
            }
        }
        self.read_retry.validate()?;
        self.write_retry.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            id: 1,
            job_name: "orders".to_string(),
            batch_size: 100,
            resume_from_checkpoint: true,
            filebase: "export".to_string(),
            group_by: vec!["country".to_string(), "meta.device".to_string()],
            read_retry: RetryConfig::short(),
            write_retry: RetryConfig::long(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = config();
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::BatchSizeZero)
        ));
    }

    #[test]
    fn empty_group_path_segment_is_rejected() {
        let mut config = config();
        config.group_by = vec!["meta..device".to_string()];
        assert!(config.validate().is_err());
    }
}
