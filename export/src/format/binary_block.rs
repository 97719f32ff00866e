use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use rand::RngCore;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::format::base::Formatter;
use crate::types::Record;

/// Magic bytes identifying a binary block artifact.
const MAGIC: &[u8; 4] = b"EXB1";

/// Length of the sync marker separating blocks.
const SYNC_LEN: usize = 16;

/// Binary framed format with one record per block.
///
/// The artifact starts with a header (magic, metadata, sync marker) and is
/// followed by blocks of `record count (u32) | payload length (u32) | payload |
/// sync marker`. Writing exactly one record per block forces a synchronization
/// boundary after every record, so the artifact stays readable even if the
/// process is killed right after any record's bytes were flushed.
#[derive(Debug)]
pub struct BinaryBlockFormatter {
    sync_marker: [u8; SYNC_LEN],
    buffer: Vec<u8>,
}

impl BinaryBlockFormatter {
    pub fn new() -> Self {
        let mut sync_marker = [0u8; SYNC_LEN];
        rand::thread_rng().fill_bytes(&mut sync_marker);

        Self {
            sync_marker,
            buffer: Vec::new(),
        }
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Decodes all complete blocks of an artifact back into record payloads.
    ///
    /// Accepts artifacts truncated at any block boundary; the magic and every
    /// sync marker are verified.
    pub fn decode_blocks(artifact: &[u8]) -> ExportResult<Vec<Value>> {
        let mut cursor = Cursor::new(artifact);

        let mut magic = [0u8; MAGIC.len()];
        std::io::Read::read_exact(&mut cursor, &mut magic)?;
        if &magic != MAGIC {
            return Err(decode_error(
                "artifact does not start with the expected magic bytes",
            ));
        }

        let metadata_len = cursor.read_u32::<LittleEndian>()? as usize;
        let mut metadata = vec![0u8; metadata_len];
        std::io::Read::read_exact(&mut cursor, &mut metadata)?;

        let mut sync_marker = [0u8; SYNC_LEN];
        std::io::Read::read_exact(&mut cursor, &mut sync_marker)?;

        let mut records = Vec::new();
        while (cursor.position() as usize) < artifact.len() {
            let count = cursor.read_u32::<LittleEndian>()?;
            if count != 1 {
                return Err(decode_error("block record count is not 1"));
            }

            let payload_len = cursor.read_u32::<LittleEndian>()? as usize;
            let mut payload = vec![0u8; payload_len];
            std::io::Read::read_exact(&mut cursor, &mut payload)?;

            let mut marker = [0u8; SYNC_LEN];
            std::io::Read::read_exact(&mut cursor, &mut marker)?;
            if marker != sync_marker {
                return Err(decode_error("block sync marker mismatch"));
            }

            records.push(serde_json::from_slice(&payload)?);
        }

        Ok(records)
    }
}

fn decode_error(detail: &str) -> ExportError {
    export_error!(ErrorKind::InvalidData, "Malformed binary block artifact", detail)
}

impl Default for BinaryBlockFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for BinaryBlockFormatter {
    fn format_header(&mut self) -> Bytes {
        let metadata =
            serde_json::json!({"format": "export/binary-block", "codec": "null"}).to_string();

        let mut header = Vec::with_capacity(MAGIC.len() + 4 + metadata.len() + SYNC_LEN);
        header.extend_from_slice(MAGIC);
        header
            .write_u32::<LittleEndian>(metadata.len() as u32)
            .expect("writing to a Vec cannot fail");
        header.extend_from_slice(metadata.as_bytes());
        header.extend_from_slice(&self.sync_marker);

        Bytes::from(header)
    }

    fn format(&mut self, record: &Record) -> ExportResult<Bytes> {
        let payload = match serde_json::to_vec(record.data()) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(record = ?record.data(), "dropping unserializable record");
                error!("record serialization failed: {err}");

                // The failure must not leak partial bytes into the next block.
                self.clear_buffer();

                return Err(export_error!(
                    ErrorKind::RecordFormatFailed,
                    "Record serialization failed",
                    err
                ));
            }
        };

        self.buffer
            .write_u32::<LittleEndian>(1)
            .expect("writing to a Vec cannot fail");
        self.buffer
            .write_u32::<LittleEndian>(payload.len() as u32)
            .expect("writing to a Vec cannot fail");
        self.buffer.extend_from_slice(&payload);
        self.buffer.extend_from_slice(&self.sync_marker);

        let block = Bytes::from(std::mem::take(&mut self.buffer));

        Ok(block)
    }

    fn item_separator(&self) -> &'static [u8] {
        // Framing is embedded in each block.
        b""
    }

    fn file_extension(&self) -> &'static str {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn artifact_for(records: &[Value]) -> (Vec<u8>, Vec<usize>) {
        let mut formatter = BinaryBlockFormatter::new();
        let mut artifact = Vec::new();
        let mut boundaries = Vec::new();

        artifact.extend_from_slice(&formatter.format_header());
        boundaries.push(artifact.len());

        for record in records {
            let block = formatter.format(&Record::new(record.clone())).unwrap();
            artifact.extend_from_slice(&block);
            boundaries.push(artifact.len());
        }

        (artifact, boundaries)
    }

    #[test]
    fn concatenated_blocks_decode_back_to_records() {
        let records = vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        let (artifact, _) = artifact_for(&records);

        let decoded = BinaryBlockFormatter::decode_blocks(&artifact).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn artifact_is_valid_after_truncation_at_any_record_boundary() {
        let records = vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        let (artifact, boundaries) = artifact_for(&records);

        for (read_up_to, boundary) in boundaries.iter().enumerate() {
            let truncated = &artifact[..*boundary];
            let decoded = BinaryBlockFormatter::decode_blocks(truncated).unwrap();
            assert_eq!(decoded.len(), read_up_to);
        }
    }

    #[test]
    fn each_block_is_independent_of_previous_failures() {
        let mut formatter = BinaryBlockFormatter::new();

        let first = formatter.format(&Record::new(json!({"n": 1}))).unwrap();
        let second = formatter.format(&Record::new(json!({"n": 2}))).unwrap();

        let mut artifact = Vec::new();
        artifact.extend_from_slice(&formatter.format_header());
        artifact.extend_from_slice(&first);
        artifact.extend_from_slice(&second);

        let decoded = BinaryBlockFormatter::decode_blocks(&artifact).unwrap();
        assert_eq!(decoded, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn separator_is_empty_for_embedded_framing() {
        let formatter = BinaryBlockFormatter::new();
        assert_eq!(formatter.item_separator(), b"");
        assert_eq!(formatter.file_extension(), "bin");
    }
}
