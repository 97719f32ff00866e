//! Checkpoint persistence.
//!
//! A [`CheckpointStore`] persists the reader position a pipeline may resume
//! from. The orchestrator stores a checkpoint only after the corresponding
//! records have been delivered, so a stored position never runs ahead of the
//! destination.

pub mod base;
pub mod memory;

pub use base::CheckpointStore;
pub use memory::MemoryCheckpointStore;
