//! Grouping of records by configured field paths.
//!
//! Grouping is a pure pass over a batch: each record is annotated with the
//! configured group key and its resolved membership values, in input order, as
//! a lazy, forward-only, non-restartable sequence.

pub mod base;
pub mod field_key;

pub use base::Grouper;
pub use field_key::FieldKeyGrouper;
