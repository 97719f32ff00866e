use serde_json::Value;

/// Sentinel value attached to a record's group membership when a configured
/// field path cannot be resolved. Grouping never aborts a batch on missing data.
pub const UNKNOWN_GROUP: &str = "unknown";

/// One logical unit of source data flowing through the pipeline.
///
/// A [`Record`] wraps an arbitrary structured mapping plus the grouping metadata
/// added by the grouper stage: the ordered field paths that defined the grouping
/// and the resolved values for this record, positionally aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    data: Value,
    /// Ordered field paths that defined the grouping of this record.
    pub group_key: Vec<String>,
    /// Resolved values, one per `group_key` entry, positionally aligned.
    pub group_membership: Vec<String>,
}

impl Record {
    /// Creates a new record from source data, with no grouping metadata attached.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            group_key: Vec::new(),
            group_membership: Vec::new(),
        }
    }

    /// Returns the record's structured data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consumes the record and returns its structured data.
    pub fn into_data(self) -> Value {
        self.data
    }
}

impl From<Value> for Record {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}
