use serde::{Deserialize, Serialize};

use crate::load::Config;
use crate::shared::{
    DestinationConfig, FormatConfig, NotificationConfig, PipelineConfig, SourceConfig,
    ValidationError,
};

/// Configuration for the export job service.
///
/// Aggregates everything required to run one export pipeline: the source,
/// destination, format, notification, and pipeline settings. Typically
/// deserialized from the configuration files and environment overrides at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportJobConfig {
    /// Configuration for the record source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Configuration for the export destination.
    #[serde(default)]
    pub destination: DestinationConfig,
    /// Configuration for the output format.
    #[serde(default)]
    pub format: FormatConfig,
    /// Configuration for run notifications.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Configuration for the export pipeline.
    pub pipeline: PipelineConfig,
}

impl ExportJobConfig {
    /// JSON rendering of the whole configuration with transport credentials
    /// redacted, safe to embed in notifications and logs.
    pub fn redacted_snapshot(&self) -> serde_json::Value {
        let mut snapshot = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);

        if let Some(notification) = snapshot.get_mut("notification") {
            for key in ["access_key", "secret_key"] {
                if let Some(value) = notification.get_mut(key) {
                    *value = serde_json::Value::String("REDACTED".to_string());
                }
            }
        }

        snapshot
    }

    /// Validates the whole configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()?;
        self.notification.validate()?;
        self.pipeline.validate()?;

        Ok(())
    }
}

impl Config for ExportJobConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[
        "notification.team_mails",
        "notification.client_mails",
        "pipeline.group_by",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_minimal_yaml() {
        let yaml = r#"
            pipeline:
              id: 7
              job_name: orders
        "#;

        let config: ExportJobConfig = serde_yaml_from_str(yaml);
        assert_eq!(config.pipeline.id, 7);
        assert_eq!(config.pipeline.batch_size, 1000);
        assert!(matches!(config.source, SourceConfig::Memory));
        assert!(matches!(config.format, FormatConfig::JsonLines));
        config.validate().unwrap();
    }

    #[test]
    fn deserializes_full_yaml() {
        let yaml = r#"
            source:
              file:
                path: /data/orders.jl
            destination:
              fs:
                root: /data/out
            format: binary_block
            notification:
              team_mails:
                - team@example.com
              client_name: Acme
            pipeline:
              id: 7
              job_name: orders
              batch_size: 500
              group_by:
                - country
                - meta.device
        "#;

        let config: ExportJobConfig = serde_yaml_from_str(yaml);
        assert!(matches!(config.destination, DestinationConfig::Fs { .. }));
        assert!(matches!(config.format, FormatConfig::BinaryBlock));
        assert_eq!(config.pipeline.group_by.len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn redacted_snapshot_hides_credentials_but_keeps_every_section() {
        let yaml = r#"
            notification:
              team_mails:
                - team@example.com
              access_key: super-secret-access
              secret_key: super-secret-key
            pipeline:
              id: 7
              job_name: orders
        "#;

        let config: ExportJobConfig = serde_yaml_from_str(yaml);
        let snapshot = config.redacted_snapshot();
        let rendered = snapshot.to_string();

        for section in ["source", "destination", "format", "notification", "pipeline"] {
            assert!(snapshot.get(section).is_some(), "missing section `{section}`");
        }
        assert_eq!(snapshot["notification"]["access_key"], "REDACTED");
        assert_eq!(snapshot["notification"]["secret_key"], "REDACTED");
        assert!(!rendered.contains("super-secret"));
    }

    fn serde_yaml_from_str(yaml: &str) -> ExportJobConfig {
        let file = config::File::from_str(yaml, config::FileFormat::Yaml);
        config::Config::builder()
            .add_source(file)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
