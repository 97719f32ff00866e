//! Record sources and the reader that adapts them to the batch model.
//!
//! A [`base::Source`] is the narrow capability seam over a concrete backend
//! (message broker, file, memory). The [`reader::Reader`] adapts any source to
//! the pipeline's batch/checkpoint model, wrapping fetches in the short retry
//! policy and tracking read counters.

pub mod base;
pub mod file;
pub mod memory;
pub mod reader;

pub use base::{Source, SourceFetch};
pub use file::FileSource;
pub use memory::MemorySource;
pub use reader::Reader;
