use std::future::Future;

use bytes::Bytes;

use crate::error::ExportResult;

/// Capability seam over a concrete sink.
///
/// Implementations append chunks under destination keys. Appending must be safe
/// to call repeatedly for the same key across flush cycles (multi-part or
/// block-based uploads); ordering within one key is the caller's concern and is
/// serialized by the writer.
pub trait Destination {
    /// Appends `chunk` to the artifact stored under `key`.
    fn put_chunk(&self, key: &str, chunk: Bytes) -> impl Future<Output = ExportResult<()>> + Send;
}
