/// Unique identifier for an export pipeline instance.
///
/// [`PipelineId`] provides a simple numeric identifier to distinguish between
/// multiple pipeline instances. This id is used for logging, checkpoint
/// isolation, and coordinating shutdown operations across pipeline components.
pub type PipelineId = u64;
