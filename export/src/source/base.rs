use std::future::Future;

use serde_json::Value;

use crate::error::ExportResult;
use crate::types::Checkpoint;

/// Result of one source fetch: the raw records and the position reached.
#[derive(Debug)]
pub struct SourceFetch {
    /// Raw structured records, in source order.
    pub records: Vec<Value>,
    /// The position immediately after the last returned record.
    pub new_position: Checkpoint,
}

/// Capability seam over a concrete record source.
///
/// Implementations adapt a backend (broker client, file, memory) to
/// position-based fetching. Fetching must not have side effects beyond the
/// backend's own read cursor; all checkpoint discipline lives in the reader.
pub trait Source {
    /// Fetches up to `batch_size` records starting at `position`.
    ///
    /// An empty `position` means the source's natural beginning. Returning no
    /// records does not by itself signal exhaustion; a polling source may simply
    /// have nothing buffered yet.
    fn fetch(
        &self,
        batch_size: usize,
        position: &Checkpoint,
    ) -> impl Future<Output = ExportResult<SourceFetch>> + Send;

    /// Returns `true` once the source has no more data to produce.
    fn is_exhausted(&self) -> impl Future<Output = ExportResult<bool>> + Send;
}
