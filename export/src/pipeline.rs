//! Export pipeline orchestrator.
//!
//! [`ExportPipeline`] drives the read, group, format, write loop over the
//! stage seams ([`Source`], [`Grouper`], [`Formatter`], [`Destination`],
//! [`Notifier`], [`CheckpointStore`]) and owns the discipline between them:
//! checkpoints are persisted only after the corresponding records have been
//! delivered, per-record format failures drop the record without aborting the
//! run, and notification failures are logged but never change the run outcome.

use std::backtrace::{Backtrace, BacktraceStatus};

use metrics::{counter, gauge};
use serde_json::Value;
use tracing::{error, info, warn};

use export_config::shared::PipelineConfig;

use crate::bail;
use crate::concurrency::shutdown::{create_shutdown_channel, ShutdownRx, ShutdownTx};
use crate::destination::Destination;
use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::format::Formatter;
use crate::group::Grouper;
use crate::metrics::{register_metrics, EXPORT_BATCH_SIZE, EXPORT_RECORDS_DROPPED_TOTAL};
use crate::notify::{Notifier, RunFailure, RunInfo};
use crate::retry::RetryPolicy;
use crate::source::{Reader, Source};
use crate::stats::StatsManager;
use crate::store::CheckpointStore;
use crate::types::BatchOutcome;
use crate::writer::Writer;

/// Lifecycle state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Finished,
    Failed,
}

/// Drives one export run end to end.
pub struct ExportPipeline<S, G, F, D, N, C> {
    config: PipelineConfig,
    reader: Reader<S>,
    grouper: G,
    formatter: F,
    writer: Writer<D>,
    notifier: N,
    store: C,
    config_snapshot: Value,
    stats: StatsManager,
    state: RunState,
    shutdown_tx: ShutdownTx,
    shutdown_rx: ShutdownRx,
}

impl<S, G, F, D, N, C> ExportPipeline<S, G, F, D, N, C>
where
    S: Source + Sync,
    G: Grouper,
    F: Formatter,
    D: Destination + Sync,
    N: Notifier,
    C: CheckpointStore,
{
    /// Assembles a pipeline from its stages, validating the configuration.
    pub fn new(
        config: PipelineConfig,
        source: S,
        grouper: G,
        mut formatter: F,
        destination: D,
        notifier: N,
        store: C,
    ) -> ExportResult<Self> {
        config.validate()?;
        register_metrics();

        let reader = Reader::new(
            source,
            config.batch_size,
            RetryPolicy::new(config.read_retry.clone()),
        );

        let header = formatter.format_header();
        let writer = Writer::new(
            destination,
            RetryPolicy::new(config.write_retry.clone()),
            config.filebase.clone(),
            config.job_name.clone(),
            formatter.file_extension(),
            header,
            formatter.item_separator(),
        );

        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let config_snapshot = serde_json::to_value(&config).unwrap_or(Value::Null);

        Ok(Self {
            config,
            reader,
            grouper,
            formatter,
            writer,
            notifier,
            store,
            config_snapshot,
            stats: StatsManager::new(),
            state: RunState::Idle,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Returns a handle that can request cooperative shutdown of this
    /// pipeline, observed between batches.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Phase timings and throughput totals collected so far.
    pub fn stats(&self) -> &StatsManager {
        &self.stats
    }

    /// Replaces the configuration snapshot rendered into failure
    /// notifications.
    ///
    /// Defaults to the pipeline section alone; the runner installs a redacted
    /// snapshot of the whole job configuration so failure mails show every
    /// resolved setting.
    pub fn set_config_snapshot(&mut self, snapshot: Value) {
        self.config_snapshot = snapshot;
    }

    /// Drives the run to completion, cancellation, or failure.
    pub async fn run(&mut self) -> ExportResult<()> {
        info!(
            pipeline_id = self.config.id,
            job_name = self.config.job_name.as_str(),
            "starting export pipeline"
        );

        self.state = RunState::Running;
        self.stats.mark("started");

        let run = RunInfo {
            pipeline_id: self.config.id,
            job_name: self.config.job_name.clone(),
        };

        // Notifications are best-effort at every stage of the run.
        if let Err(err) = self.notifier.notify_start(&run).await {
            warn!("failed to send start notification: {err}");
        }

        match self.run_loop().await {
            Ok(()) => {
                self.stats.mark("finished");
                self.state = RunState::Finished;

                let items_count = self.writer.items_written();
                if let Err(err) = self.notifier.notify_complete(&run, items_count).await {
                    warn!("failed to send completion notification: {err}");
                }

                self.stats.log_report("completed");

                Ok(())
            }
            Err(err) => {
                let cancelled = err.kind() == ErrorKind::Cancelled;
                let outcome = if cancelled { "cancelled" } else { "failed" };

                self.stats.mark(outcome);
                self.state = RunState::Failed;

                error!(
                    pipeline_id = self.config.id,
                    outcome, "export pipeline stopped: {err}"
                );

                let failure = RunFailure {
                    message: err.to_string(),
                    backtrace: capture_backtrace(),
                    config_snapshot: self.config_snapshot.clone(),
                };
                if let Err(notify_err) = self.notifier.notify_failure(&run, &failure).await {
                    warn!("failed to send failure notification: {notify_err}");
                }

                self.stats.log_report(outcome);

                Err(err)
            }
        }
    }

    async fn run_loop(&mut self) -> ExportResult<()> {
        if self.config.resume_from_checkpoint {
            if let Some(checkpoint) = self.store.load_checkpoint(self.config.id).await? {
                info!(checkpoint = ?checkpoint, "resuming from stored checkpoint");
                self.reader.restore(checkpoint);
            }
        }

        loop {
            // Observed only between batches, so in-flight work is flushed and
            // checkpointed before the run stops.
            if self.shutdown_requested() {
                self.writer.flush().await?;
                self.store
                    .store_checkpoint(self.config.id, self.reader.checkpoint())
                    .await?;

                bail!(
                    ErrorKind::Cancelled,
                    "Pipeline run cancelled by shutdown signal"
                );
            }

            match self.reader.next_batch().await? {
                BatchOutcome::Exhausted => {
                    let footer = self.formatter.format_footer();
                    self.writer.finish(footer).await?;
                    self.store
                        .store_checkpoint(self.config.id, self.reader.checkpoint())
                        .await?;

                    return Ok(());
                }
                BatchOutcome::Batch(batch) => {
                    let read = batch.len() as u64;
                    gauge!(EXPORT_BATCH_SIZE).set(read as f64);

                    let mut written = 0u64;
                    let mut dropped = 0u64;

                    for record in self.grouper.group_batch(batch) {
                        match self.formatter.format(&record) {
                            Ok(formatted) => {
                                self.writer.buffer_record(&record.group_membership, formatted);
                                written += 1;
                            }
                            Err(err) if err.kind() == ErrorKind::RecordFormatFailed => {
                                counter!(EXPORT_RECORDS_DROPPED_TOTAL).increment(1);
                                dropped += 1;

                                warn!("dropping record that failed to format: {err}");
                            }
                            Err(err) => return Err(err),
                        }
                    }

                    self.writer.flush().await?;

                    // Only now is it safe to move the stored position past this
                    // batch.
                    self.store
                        .store_checkpoint(self.config.id, self.reader.checkpoint())
                        .await?;

                    self.stats.record_batch(read, written, dropped);
                    self.stats.mark_iteration();
                    self.stats.log_iteration(read, written, dropped);
                }
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_rx.has_changed().unwrap_or(false)
    }
}

/// Backtrace where the run failure surfaced, when capture is enabled via
/// `RUST_BACKTRACE`.
fn capture_backtrace() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}
