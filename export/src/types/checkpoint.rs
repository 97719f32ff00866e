use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque resumption marker for a reader.
///
/// A [`Checkpoint`] captures enough source-defined state (e.g. offsets) to resume
/// reading after a restart without message loss, at the cost of possible duplicate
/// delivery for the batch in flight at failure time. The pipeline only advances a
/// checkpoint after all writes for the corresponding batch have succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint(BTreeMap<String, Value>);

impl Checkpoint {
    /// Creates an empty checkpoint, representing the source's natural beginning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this checkpoint carries no position information.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets a position entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Returns the position entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the entry for `key` interpreted as an unsigned offset.
    pub fn offset(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }
}

impl FromIterator<(String, Value)> for Checkpoint {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
