use std::time::Duration;

use metrics::counter;
use tracing::debug;

use crate::error::ExportResult;
use crate::metrics::EXPORT_RECORDS_READ_TOTAL;
use crate::retry::RetryPolicy;
use crate::source::base::Source;
use crate::types::{Batch, BatchOutcome, Checkpoint, Record};

/// Delay before re-polling a still-producing source that returned an empty
/// fetch.
const EMPTY_FETCH_DELAY: Duration = Duration::from_millis(100);

/// Adapts a [`Source`] to the pipeline's batch and checkpoint model.
///
/// The reader owns the resumption position: [`Reader::checkpoint`] always points
/// at the end of the most recently fully-yielded batch, never past data not yet
/// handed to the orchestrator. Fetches are wrapped in the short retry policy so
/// transient broker or network errors are absorbed; non-transient errors
/// propagate unchanged.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    batch_size: usize,
    retry: RetryPolicy,
    position: Checkpoint,
    finished: bool,
    records_read: u64,
}

impl<S> Reader<S>
where
    S: Source,
{
    pub fn new(source: S, batch_size: usize, retry: RetryPolicy) -> Self {
        Self {
            source,
            batch_size,
            retry,
            position: Checkpoint::new(),
            finished: false,
            records_read: 0,
        }
    }

    /// Fetches the next batch, or reports exhaustion.
    ///
    /// Keeps polling across empty fetches, pausing briefly between polls, until
    /// the source either produces records or signals exhaustion. The internal
    /// position only advances once a full batch has been successfully produced.
    pub async fn next_batch(&mut self) -> ExportResult<BatchOutcome> {
        if self.finished {
            return Ok(BatchOutcome::Exhausted);
        }

        loop {
            let source = &self.source;
            let position = self.position.clone();
            let batch_size = self.batch_size;

            let fetch = self
                .retry
                .execute("source fetch", || source.fetch(batch_size, &position))
                .await?;

            if !fetch.records.is_empty() {
                let records: Vec<Record> =
                    fetch.records.into_iter().map(Record::new).collect();

                self.records_read += records.len() as u64;
                counter!(EXPORT_RECORDS_READ_TOTAL).increment(records.len() as u64);

                // The position may only move once the full batch is handed over.
                self.position = fetch.new_position;

                debug!(batch_len = records.len(), "done reading batch");

                return Ok(BatchOutcome::Batch(Batch::new(records)));
            }

            if self.source.is_exhausted().await? {
                self.finished = true;

                debug!(records_read = self.records_read, "source exhausted");

                return Ok(BatchOutcome::Exhausted);
            }

            // Empty fetch from a source that is still producing: advance past the
            // empty window and poll again after a short delay.
            self.position = fetch.new_position;
            tokio::time::sleep(EMPTY_FETCH_DELAY).await;
        }
    }

    /// Returns the position reached by the most recently fully-yielded batch.
    pub fn checkpoint(&self) -> Checkpoint {
        self.position.clone()
    }

    /// Seeds the reader so the next fetch continues from the given position.
    ///
    /// An empty checkpoint means reading starts from the source's natural
    /// beginning.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint;
        self.finished = false;
    }

    /// Returns `true` once the source has signalled exhaustion.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total number of records yielded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}
