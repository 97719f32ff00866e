use std::future::Future;

use crate::error::ExportResult;
use crate::types::PipelineId;

/// Symbolic or literal destination for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// The configured team address list.
    Team,
    /// The configured client address list.
    Clients,
    /// A literal mail address.
    Address(String),
}

/// Identifying facts about the run a notification describes.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub pipeline_id: PipelineId,
    pub job_name: String,
}

/// Failure details attached to a failure notification.
///
/// The configuration snapshot is built from the pipeline's non-secret
/// configuration only.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub message: String,
    /// Backtrace captured where the failure surfaced, when available.
    pub backtrace: Option<String>,
    pub config_snapshot: serde_json::Value,
}

/// Announces run lifecycle events.
pub trait Notifier {
    /// Announces that a run has started.
    fn notify_start(&self, run: &RunInfo) -> impl Future<Output = ExportResult<()>> + Send;

    /// Announces that a run completed, with the number of records delivered.
    fn notify_complete(
        &self,
        run: &RunInfo,
        items_count: u64,
    ) -> impl Future<Output = ExportResult<()>> + Send;

    /// Announces that a run failed.
    fn notify_failure(
        &self,
        run: &RunInfo,
        failure: &RunFailure,
    ) -> impl Future<Output = ExportResult<()>> + Send;
}
