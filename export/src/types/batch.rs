use crate::types::Record;

/// A finite, single-pass-consumable sequence of records produced by one reader fetch.
///
/// The reader exclusively produces batches; downstream stages only read or annotate
/// the records as they are consumed. A batch is processed as a unit before the
/// pipeline checkpoints.
#[derive(Debug, Default)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    /// Creates a batch from the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Returns the number of records in this batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if this batch contains no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Outcome of a reader fetch.
///
/// End-of-stream is an explicit status instead of an error, so exhaustion is
/// observed by the orchestrator without control flow by exception.
#[derive(Debug)]
pub enum BatchOutcome {
    /// A batch of records is available for processing.
    Batch(Batch),
    /// The source has no more data to produce.
    Exhausted,
}
