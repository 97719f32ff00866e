use std::future::Future;

use crate::error::ExportResult;
use crate::types::{Checkpoint, PipelineId};

/// Persists reader checkpoints keyed by pipeline id.
pub trait CheckpointStore {
    /// Loads the last stored checkpoint for a pipeline, if any.
    fn load_checkpoint(
        &self,
        pipeline_id: PipelineId,
    ) -> impl Future<Output = ExportResult<Option<Checkpoint>>> + Send;

    /// Stores a checkpoint for a pipeline, replacing any previous one.
    fn store_checkpoint(
        &self,
        pipeline_id: PipelineId,
        checkpoint: Checkpoint,
    ) -> impl Future<Output = ExportResult<()>> + Send;
}
