//! Group-partitioned artifact writer.
//!
//! The writer receives already-formatted record bytes together with the
//! record's group membership, buffers them per artifact, and flushes the
//! buffers to a [`Destination`] as appended chunks. Records of different
//! groups never share an artifact; all records of one group land in the same
//! artifact regardless of which batch they arrived in.

use std::collections::BTreeMap;
use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::destination::Destination;
use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::metrics::{EXPORT_BATCH_WRITE_DURATION_SECONDS, EXPORT_RECORDS_WRITTEN_TOTAL};
use crate::retry::RetryPolicy;

/// Per-artifact accounting, kept for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactStats {
    /// Number of records delivered to this artifact.
    pub items: u64,
    /// Number of bytes delivered to this artifact.
    pub bytes: u64,
    /// Number of chunks appended to this artifact.
    pub chunks: u64,
}

#[derive(Debug, Default)]
struct PendingChunk {
    buffer: Vec<u8>,
    records: u64,
}

/// Buffers formatted records per artifact and delivers them with bounded
/// retries.
///
/// Delivery failures that survive the retry policy are returned as
/// [`ErrorKind::DeliveryFailed`] and are fatal to the run; chunks not yet
/// delivered stay buffered, so a later flush retries them without losing
/// records.
#[derive(Debug)]
pub struct Writer<D> {
    destination: D,
    retry: RetryPolicy,
    filebase: String,
    job_name: String,
    extension: String,
    header: Bytes,
    separator: Vec<u8>,
    pending: BTreeMap<String, PendingChunk>,
    stats: BTreeMap<String, ArtifactStats>,
}

impl<D: Destination> Writer<D> {
    pub fn new(
        destination: D,
        retry: RetryPolicy,
        filebase: impl Into<String>,
        job_name: impl Into<String>,
        extension: impl Into<String>,
        header: Bytes,
        separator: &[u8],
    ) -> Self {
        Self {
            destination,
            retry,
            filebase: filebase.into(),
            job_name: job_name.into(),
            extension: extension.into(),
            header,
            separator: separator.to_vec(),
            pending: BTreeMap::new(),
            stats: BTreeMap::new(),
        }
    }

    /// Artifact key for a record with the given group membership.
    ///
    /// Ungrouped records (empty membership) share a single artifact directly
    /// under the filebase prefix.
    fn artifact_key(&self, membership: &[String]) -> String {
        if membership.is_empty() {
            format!("{}/{}.{}", self.filebase, self.job_name, self.extension)
        } else {
            format!(
                "{}/{}/{}.{}",
                self.filebase,
                membership.join("/"),
                self.job_name,
                self.extension
            )
        }
    }

    /// Buffers one formatted record for its group's artifact.
    pub fn buffer_record(&mut self, membership: &[String], formatted: Bytes) {
        let key = self.artifact_key(membership);
        let started = self.stats.get(&key).is_some_and(|stats| stats.items > 0);
        let header = self.header.clone();
        let separator = self.separator.clone();

        let pending = self.pending.entry(key.clone()).or_default();
        if !started && pending.records == 0 {
            pending.buffer.extend_from_slice(&header);
        } else if pending.records > 0 || started {
            pending.buffer.extend_from_slice(&separator);
        }
        pending.buffer.extend_from_slice(&formatted);
        pending.records += 1;

        self.stats.entry(key).or_default().items += 1;
    }

    /// Delivers all buffered chunks to the destination.
    ///
    /// Each artifact's buffer is appended as one chunk, wrapped in the write
    /// retry policy. The first failure that survives retries aborts the flush;
    /// the failing chunk and all chunks after it stay buffered for a later
    /// flush.
    pub async fn flush(&mut self) -> ExportResult<()> {
        let keys: Vec<String> = self.pending.keys().cloned().collect();
        for key in keys {
            let chunk = &self.pending[&key];
            let bytes = Bytes::copy_from_slice(&chunk.buffer);
            let records = chunk.records;

            self.deliver(&key, bytes.clone()).await?;
            self.pending.remove(&key);

            let stats = self.stats.entry(key.clone()).or_default();
            stats.bytes += bytes.len() as u64;
            stats.chunks += 1;

            counter!(EXPORT_RECORDS_WRITTEN_TOTAL).increment(records);
            debug!(
                artifact = key.as_str(),
                records,
                bytes = bytes.len(),
                "delivered chunk"
            );
        }

        Ok(())
    }

    /// Flushes remaining buffers and appends the footer to every artifact that
    /// received records.
    pub async fn finish(&mut self, footer: Bytes) -> ExportResult<()> {
        self.flush().await?;

        if !footer.is_empty() {
            let keys: Vec<String> = self
                .stats
                .iter()
                .filter(|(_, stats)| stats.items > 0)
                .map(|(key, _)| key.clone())
                .collect();

            for key in keys {
                self.deliver(&key, footer.clone()).await?;
                let stats = self.stats.entry(key).or_default();
                stats.bytes += footer.len() as u64;
                stats.chunks += 1;
            }
        }

        info!(
            artifacts = self.stats.len(),
            items = self.items_written(),
            "writer finished"
        );

        Ok(())
    }

    async fn deliver(&self, key: &str, chunk: Bytes) -> ExportResult<()> {
        let destination = &self.destination;
        let started_at = Instant::now();

        let result = self
            .retry
            .execute("put_chunk", || {
                let chunk = chunk.clone();
                async move { destination.put_chunk(key, chunk).await }
            })
            .await;

        histogram!(EXPORT_BATCH_WRITE_DURATION_SECONDS).record(started_at.elapsed().as_secs_f64());

        result.map_err(|err| {
            export_error!(
                ErrorKind::DeliveryFailed,
                "Failed to deliver chunk after exhausting retries",
                format!("{key}: {err}")
            )
        })
    }

    /// Total number of records delivered across all artifacts.
    pub fn items_written(&self) -> u64 {
        self.stats.values().map(|stats| stats.items).sum()
    }

    /// Per-artifact delivery statistics, keyed by artifact key.
    pub fn artifact_stats(&self) -> &BTreeMap<String, ArtifactStats> {
        &self.stats
    }
}
