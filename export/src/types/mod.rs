//! Common types used throughout the export pipeline.
//!
//! Re-exports the record, batch and checkpoint types that flow between pipeline
//! stages, plus pipeline identifiers.

mod batch;
mod checkpoint;
mod pipeline;
mod record;

pub use batch::*;
pub use checkpoint::*;
pub use pipeline::*;
pub use record::*;
