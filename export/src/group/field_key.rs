use serde_json::Value;

use crate::group::base::Grouper;
use crate::types::{Batch, Record, UNKNOWN_GROUP};

/// Groups records by the values behind configured field paths.
///
/// Dot-notation traverses nested mappings: `meta.device` resolves
/// `{"meta": {"device": "mobile"}}` to `mobile`. An absent path at any depth
/// resolves the whole path to the `"unknown"` sentinel instead of failing.
#[derive(Debug, Clone)]
pub struct FieldKeyGrouper {
    keys: Vec<String>,
}

impl FieldKeyGrouper {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Resolves `path` against `data`, descending one dot-separated segment at
    /// a time.
    fn resolve(data: &Value, path: &str) -> String {
        let mut current = data;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(value) => current = value,
                None => return UNKNOWN_GROUP.to_string(),
            }
        }

        match current {
            Value::String(text) => text.clone(),
            Value::Null => UNKNOWN_GROUP.to_string(),
            other => other.to_string(),
        }
    }
}

impl Grouper for FieldKeyGrouper {
    fn group_batch(&self, batch: Batch) -> impl Iterator<Item = Record> + '_ {
        batch.into_iter().map(move |mut record| {
            record.group_key = self.keys.clone();
            record.group_membership = self
                .keys
                .iter()
                .map(|key| Self::resolve(record.data(), key))
                .collect();

            record
        })
    }
}
