//! Record formatters.
//!
//! A formatter turns one record into sink-ready bytes, plus optional framing
//! emitted once per output artifact. Binary formatters must keep each record's
//! output self-contained and independently decodable when concatenated after the
//! header, so the artifact stays valid even if the process dies right after any
//! single record's bytes are flushed.

pub mod base;
pub mod binary_block;
pub mod json_lines;

pub use base::Formatter;
pub use binary_block::BinaryBlockFormatter;
pub use json_lines::JsonLinesFormatter;
