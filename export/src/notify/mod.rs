//! Run lifecycle notifications.
//!
//! A [`Notifier`] announces pipeline run starts, completions, and failures.
//! Notification delivery is best-effort: the orchestrator logs notifier errors
//! and never lets them change a run's outcome.

pub mod base;
pub mod log;
pub mod mail;
pub mod template;

pub use base::{Notifier, Recipient, RunFailure, RunInfo};
pub use log::LogNotifier;
pub use mail::{Mail, MailNotifier, NotificationTransport};
