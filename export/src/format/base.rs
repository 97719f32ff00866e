use bytes::Bytes;

use crate::error::ExportResult;
use crate::types::Record;

/// Serializes single records into sink-ready bytes.
///
/// Each call to [`Formatter::format`] must be self-contained: a failure on one
/// record leaves no partial bytes behind for the next, and the record's output
/// is independently decodable when concatenated after the header. On a
/// per-record failure the formatter returns [`crate::error::ErrorKind::RecordFormatFailed`]
/// with its internal buffer cleared; the record is dropped by the caller and
/// the run continues.
pub trait Formatter {
    /// Bytes emitted once at the start of every output artifact.
    fn format_header(&mut self) -> Bytes {
        Bytes::new()
    }

    /// Formats one record into sink-ready bytes.
    fn format(&mut self, record: &Record) -> ExportResult<Bytes>;

    /// Bytes emitted once at the end of every output artifact.
    fn format_footer(&mut self) -> Bytes {
        Bytes::new()
    }

    /// Separator the writer places between consecutive formatted records.
    ///
    /// Binary framed formats embed their framing and use an empty separator.
    fn item_separator(&self) -> &'static [u8] {
        b"\n"
    }

    /// File extension for artifacts produced by this formatter.
    fn file_extension(&self) -> &'static str;
}
