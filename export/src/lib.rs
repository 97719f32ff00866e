pub mod concurrency;
pub mod destination;
pub mod error;
pub mod format;
pub mod group;
mod macros;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod retry;
pub mod source;
pub mod stats;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod writer;
