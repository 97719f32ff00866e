//! Shared helpers for pipeline integration tests.

use std::sync::Arc;

use bytes::Bytes;
use export::destination::Destination;
use export::error::{ErrorKind, ExportError, ExportResult};
use export::export_error;
use export::format::{Formatter, JsonLinesFormatter};
use export::notify::{Mail, NotificationTransport};
use export::retry::RetryPolicy;
use export::types::Record;
use export_config::shared::{PipelineConfig, RetryConfig};
use tokio::sync::Mutex;

pub fn fast_retry_config(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay_ms: 1,
        max_delay_ms: 1,
        backoff_factor: 1.0,
        jitter: false,
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(fast_retry_config(max_attempts))
}

pub fn pipeline_config(id: u64, batch_size: usize, group_by: Vec<String>) -> PipelineConfig {
    PipelineConfig {
        id,
        job_name: "orders".to_string(),
        batch_size,
        resume_from_checkpoint: true,
        filebase: "export".to_string(),
        group_by,
        read_retry: fast_retry_config(3),
        write_retry: fast_retry_config(3),
    }
}

/// Mail transport that records every sent mail.
#[derive(Debug, Clone, Default)]
pub struct CaptureTransport {
    sent: Arc<Mutex<Vec<Mail>>>,
}

impl CaptureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Mail> {
        self.sent.lock().await.clone()
    }
}

impl NotificationTransport for CaptureTransport {
    async fn send(&self, mail: &Mail) -> ExportResult<()> {
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

/// Mail transport whose every send fails.
#[derive(Debug, Clone, Default)]
pub struct FailingTransport;

impl NotificationTransport for FailingTransport {
    async fn send(&self, _mail: &Mail) -> ExportResult<()> {
        Err(export_error!(
            ErrorKind::IoError,
            "Injected transport failure"
        ))
    }
}

/// Destination whose every append fails with a transient error.
#[derive(Debug, Clone, Default)]
pub struct FailingDestination;

impl Destination for FailingDestination {
    async fn put_chunk(&self, _key: &str, _chunk: Bytes) -> ExportResult<()> {
        Err(export_error!(
            ErrorKind::DestinationIoError,
            "Injected destination failure"
        ))
    }
}

/// JSON lines formatter that refuses records carrying a `poison` field.
#[derive(Debug, Default)]
pub struct PoisonFormatter {
    inner: JsonLinesFormatter,
}

impl PoisonFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Formatter for PoisonFormatter {
    fn format(&mut self, record: &Record) -> ExportResult<Bytes> {
        if record.data().get("poison").is_some() {
            return Err(export_error!(
                ErrorKind::RecordFormatFailed,
                "Injected record format failure"
            ));
        }

        self.inner.format(record)
    }

    fn file_extension(&self) -> &'static str {
        self.inner.file_extension()
    }
}
