use crate::types::{Batch, Record};

/// Pure annotation pass over a batch.
///
/// Implementations attach `group_key`/`group_membership` to each record and
/// re-emit it, preserving input order. The returned sequence is lazy and
/// single-pass; the full batch is never materialized by the grouper itself.
/// Missing fields never fail a record.
pub trait Grouper {
    /// Returns the grouped batch as a lazy, forward-only sequence.
    fn group_batch(&self, batch: Batch) -> impl Iterator<Item = Record> + '_;
}
