use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ExportResult;
use crate::store::base::CheckpointStore;
use crate::types::{Checkpoint, PipelineId};

#[derive(Debug, Default)]
struct Inner {
    checkpoints: HashMap<PipelineId, Checkpoint>,
}

/// In-memory checkpoint store for ephemeral runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    async fn load_checkpoint(&self, pipeline_id: PipelineId) -> ExportResult<Option<Checkpoint>> {
        let inner = self.inner.lock().await;
        Ok(inner.checkpoints.get(&pipeline_id).cloned())
    }

    async fn store_checkpoint(
        &self,
        pipeline_id: PipelineId,
        checkpoint: Checkpoint,
    ) -> ExportResult<()> {
        let mut inner = self.inner.lock().await;
        inner.checkpoints.insert(pipeline_id, checkpoint);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn stores_and_replaces_checkpoints_per_pipeline() {
        let store = MemoryCheckpointStore::new();

        assert_eq!(store.load_checkpoint(1).await.unwrap(), None);

        let first: Checkpoint = [("offset".to_string(), json!(3))].into_iter().collect();
        store.store_checkpoint(1, first.clone()).await.unwrap();
        assert_eq!(store.load_checkpoint(1).await.unwrap(), Some(first));

        let second: Checkpoint = [("offset".to_string(), json!(6))].into_iter().collect();
        store.store_checkpoint(1, second.clone()).await.unwrap();
        assert_eq!(store.load_checkpoint(1).await.unwrap(), Some(second));
        assert_eq!(store.load_checkpoint(2).await.unwrap(), None);
    }
}
