use export::destination::{Destination, FsDestination, MemoryDestination};
use export::error::ExportResult;
use export::format::{BinaryBlockFormatter, Formatter, JsonLinesFormatter};
use export::group::FieldKeyGrouper;
use export::notify::{LogNotifier, Mail, MailNotifier, NotificationTransport, Notifier};
use export::pipeline::ExportPipeline;
use export::retry::RetryPolicy;
use export::source::{FileSource, MemorySource, Source};
use export::store::MemoryCheckpointStore;
use export_config::shared::{
    DestinationConfig, ExportJobConfig, FormatConfig, NotificationConfig, PipelineConfig,
    SourceConfig,
};
use tracing::{info, warn};

use crate::config::load_export_job_config;

pub async fn start_export_job() -> anyhow::Result<()> {
    info!("starting export job");
    let config = load_export_job_config()?;

    log_config(&config);

    // For each source, we build the pipeline with static dispatch. This is more
    // verbose, but we prefer more performance at the cost of ergonomics.
    match config.source.clone() {
        SourceConfig::Memory => with_source(MemorySource::new(Vec::new()), config).await?,
        SourceConfig::File { path } => with_source(FileSource::new(path), config).await?,
    }

    info!("export job completed");

    Ok(())
}

async fn with_source<S>(source: S, config: ExportJobConfig) -> anyhow::Result<()>
where
    S: Source + Sync,
{
    match config.destination.clone() {
        DestinationConfig::Memory => with_stages(source, MemoryDestination::new(), config).await,
        DestinationConfig::Fs { root } => {
            with_stages(source, FsDestination::new(root), config).await
        }
    }
}

async fn with_stages<S, D>(source: S, destination: D, config: ExportJobConfig) -> anyhow::Result<()>
where
    S: Source + Sync,
    D: Destination + Sync,
{
    match config.format {
        FormatConfig::JsonLines => {
            with_format(source, destination, JsonLinesFormatter::new(), config).await
        }
        FormatConfig::BinaryBlock => {
            with_format(source, destination, BinaryBlockFormatter::new(), config).await
        }
    }
}

async fn with_format<S, D, F>(
    source: S,
    destination: D,
    formatter: F,
    config: ExportJobConfig,
) -> anyhow::Result<()>
where
    S: Source + Sync,
    D: Destination + Sync,
    F: Formatter,
{
    // Failure mails carry the full resolved configuration, credentials
    // redacted.
    let config_snapshot = config.redacted_snapshot();

    let has_recipients = !config.notification.team_mails.is_empty()
        || !config.notification.client_mails.is_empty();

    if has_recipients {
        let notifier = MailNotifier::new(
            config.notification.clone(),
            TracingMailTransport,
            RetryPolicy::long(),
        )?;

        run_pipeline(
            source,
            destination,
            formatter,
            notifier,
            config.pipeline,
            config_snapshot,
        )
        .await
    } else {
        run_pipeline(
            source,
            destination,
            formatter,
            LogNotifier::new(),
            config.pipeline,
            config_snapshot,
        )
        .await
    }
}

async fn run_pipeline<S, D, F, N>(
    source: S,
    destination: D,
    formatter: F,
    notifier: N,
    config: PipelineConfig,
    config_snapshot: serde_json::Value,
) -> anyhow::Result<()>
where
    S: Source + Sync,
    D: Destination + Sync,
    F: Formatter,
    N: Notifier,
{
    let grouper = FieldKeyGrouper::new(config.group_by.clone());
    let store = MemoryCheckpointStore::new();

    let mut pipeline =
        ExportPipeline::new(config, source, grouper, formatter, destination, notifier, store)?;
    pipeline.set_config_snapshot(config_snapshot);

    // Spawn a task to listen for shutdown signals and trigger shutdown.
    let shutdown_tx = pipeline.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        // Listen for SIGTERM, sent by the scheduler before SIGKILL during
        // termination.
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT (Ctrl+C) received, shutting down pipeline");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down pipeline");
            }
        }

        if let Err(e) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {:?}", e);
        }
    });

    let result = pipeline.run().await;

    // If the pipeline finished before any signal arrived, the listener task is
    // still pending and must be torn down.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    result?;

    Ok(())
}

/// Transport that renders notification mails into the log stream.
///
/// Stands in for a real mail provider; production deployments implement
/// [`NotificationTransport`] over their provider's SDK and wire it here.
#[derive(Debug, Clone)]
struct TracingMailTransport;

impl NotificationTransport for TracingMailTransport {
    async fn send(&self, mail: &Mail) -> ExportResult<()> {
        info!(
            from = mail.from.as_str(),
            to = ?mail.to,
            subject = mail.subject.as_str(),
            "notification mail:\n{}",
            mail.body
        );

        Ok(())
    }
}

fn log_config(config: &ExportJobConfig) {
    log_source_config(&config.source);
    log_destination_config(&config.destination);
    log_notification_config(&config.notification);
    log_pipeline_config(&config.pipeline);
}

fn log_source_config(config: &SourceConfig) {
    match config {
        SourceConfig::Memory => {
            info!("memory source config");
        }
        SourceConfig::File { path } => {
            info!(path, "file source config");
        }
    }
}

fn log_destination_config(config: &DestinationConfig) {
    match config {
        DestinationConfig::Memory => {
            info!("memory destination config");
        }
        DestinationConfig::Fs { root } => {
            info!(root, "fs destination config");
        }
    }
}

fn log_notification_config(config: &NotificationConfig) {
    info!(
        team_mails = config.team_mails.len(),
        client_mails = config.client_mails.len(),
        client_name = config.client_name,
        mail_from = config.mail_from,
        "notification config",
    );
}

fn log_pipeline_config(config: &PipelineConfig) {
    info!(
        pipeline_id = config.id,
        job_name = config.job_name,
        batch_size = config.batch_size,
        resume_from_checkpoint = config.resume_from_checkpoint,
        filebase = config.filebase,
        group_by = ?config.group_by,
        "pipeline config",
    );
}
