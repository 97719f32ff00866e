use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ExportResult;
use crate::source::base::{Source, SourceFetch};
use crate::types::Checkpoint;

/// Checkpoint key under which the memory source records its read offset.
const OFFSET_KEY: &str = "offset";

#[derive(Debug)]
struct Inner {
    records: Vec<Value>,
    exhausted: bool,
}

/// In-memory source for ephemeral or test data.
///
/// Positions are plain offsets into the backing vector, so restoring a
/// checkpoint resumes mid-stream exactly.
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySource {
    pub fn new(records: Vec<Value>) -> Self {
        let inner = Inner {
            records,
            exhausted: false,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl Source for MemorySource {
    async fn fetch(&self, batch_size: usize, position: &Checkpoint) -> ExportResult<SourceFetch> {
        let mut inner = self.inner.lock().await;

        let offset = position.offset(OFFSET_KEY).unwrap_or(0) as usize;
        let end = offset.saturating_add(batch_size).min(inner.records.len());
        let records = if offset < inner.records.len() {
            inner.records[offset..end].to_vec()
        } else {
            Vec::new()
        };

        inner.exhausted = end >= inner.records.len();

        debug!(
            offset,
            fetched = records.len(),
            exhausted = inner.exhausted,
            "fetched records from memory source"
        );

        let mut new_position = Checkpoint::new();
        new_position.insert(OFFSET_KEY, Value::from(end as u64));

        Ok(SourceFetch {
            records,
            new_position,
        })
    }

    async fn is_exhausted(&self) -> ExportResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.exhausted)
    }
}
