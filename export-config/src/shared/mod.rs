mod base;
mod destination;
mod format;
mod job;
mod notification;
mod pipeline;
mod retry;
mod source;

pub use base::*;
pub use destination::*;
pub use format::*;
pub use job::*;
pub use notification::*;
pub use pipeline::*;
pub use retry::*;
pub use source::*;
