use bytes::Bytes;

use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::format::base::Formatter;
use crate::types::Record;

/// One JSON document per record, newline separated.
#[derive(Debug, Default)]
pub struct JsonLinesFormatter;

impl JsonLinesFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonLinesFormatter {
    fn format(&mut self, record: &Record) -> ExportResult<Bytes> {
        let encoded = serde_json::to_vec(record.data()).map_err(|err| {
            export_error!(
                ErrorKind::RecordFormatFailed,
                "Record JSON serialization failed",
                err
            )
        })?;

        Ok(Bytes::from(encoded))
    }

    fn file_extension(&self) -> &'static str {
        "jl"
    }
}
