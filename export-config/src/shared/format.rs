use serde::{Deserialize, Serialize};

/// Configuration options for supported export formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatConfig {
    /// One JSON document per line, newline separated.
    JsonLines,
    /// Binary block format: one record per sync-framed block, safe to truncate
    /// at any record boundary.
    BinaryBlock,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self::JsonLines
    }
}
