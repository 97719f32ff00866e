//! Export destinations.
//!
//! A [`base::Destination`] is the narrow capability seam over a concrete sink:
//! it appends chunks of bytes under artifact keys. Partitioning, framing and
//! retry discipline live in [`crate::writer::Writer`].

pub mod base;
pub mod fs;
pub mod memory;

pub use base::Destination;
pub use fs::FsDestination;
pub use memory::MemoryDestination;
