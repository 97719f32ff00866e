use tracing::{error, info};

use crate::error::ExportResult;
use crate::notify::base::{Notifier, RunFailure, RunInfo};

/// Notifier that writes lifecycle events to the log stream.
///
/// Used when no mail transport is configured; keeps the orchestrator's
/// notification flow uniform.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    async fn notify_start(&self, run: &RunInfo) -> ExportResult<()> {
        info!(
            pipeline_id = run.pipeline_id,
            job_name = run.job_name.as_str(),
            "export run started"
        );

        Ok(())
    }

    async fn notify_complete(&self, run: &RunInfo, items_count: u64) -> ExportResult<()> {
        info!(
            pipeline_id = run.pipeline_id,
            job_name = run.job_name.as_str(),
            items_count,
            "export run completed"
        );

        Ok(())
    }

    async fn notify_failure(&self, run: &RunInfo, failure: &RunFailure) -> ExportResult<()> {
        error!(
            pipeline_id = run.pipeline_id,
            job_name = run.job_name.as_str(),
            config = %failure.config_snapshot,
            "export run failed: {}",
            failure.message
        );

        Ok(())
    }
}
