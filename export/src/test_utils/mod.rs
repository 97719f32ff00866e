//! Shared test doubles for unit and integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::destination::Destination;
use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::notify::{Mail, NotificationTransport};
use crate::source::{Source, SourceFetch};
use crate::types::Checkpoint;

/// Source wrapper that fails with a transient error a fixed number of times
/// before delegating to the inner source.
#[derive(Debug, Clone)]
pub struct FlakySource<S> {
    inner: S,
    failures_left: Arc<AtomicU32>,
}

impl<S> FlakySource<S> {
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            failures_left: Arc::new(AtomicU32::new(failures)),
        }
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

impl<S: Source + Sync> Source for FlakySource<S> {
    async fn fetch(&self, batch_size: usize, position: &Checkpoint) -> ExportResult<SourceFetch> {
        if self.take_failure() {
            return Err(export_error!(
                ErrorKind::SourceIoError,
                "Injected transient source failure"
            ));
        }

        self.inner.fetch(batch_size, position).await
    }

    async fn is_exhausted(&self) -> ExportResult<bool> {
        self.inner.is_exhausted().await
    }
}

/// Destination wrapper that fails with a transient error a fixed number of
/// times before delegating to the inner destination.
#[derive(Debug, Clone)]
pub struct FlakyDestination<D> {
    inner: D,
    failures_left: Arc<AtomicU32>,
}

impl<D> FlakyDestination<D> {
    pub fn new(inner: D, failures: u32) -> Self {
        Self {
            inner,
            failures_left: Arc::new(AtomicU32::new(failures)),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

impl<D: Destination + Sync> Destination for FlakyDestination<D> {
    async fn put_chunk(&self, key: &str, chunk: Bytes) -> ExportResult<()> {
        if self.take_failure() {
            return Err(export_error!(
                ErrorKind::DestinationIoError,
                "Injected transient destination failure"
            ));
        }

        self.inner.put_chunk(key, chunk).await
    }
}

/// Mail transport that records sent mails, or fails every send.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Mail>>>,
    failing: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every send fails with a transient error.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    pub async fn sent(&self) -> Vec<Mail> {
        self.sent.lock().await.clone()
    }
}

impl NotificationTransport for MemoryTransport {
    async fn send(&self, mail: &Mail) -> ExportResult<()> {
        if self.failing {
            return Err(export_error!(
                ErrorKind::IoError,
                "Injected transient transport failure"
            ));
        }

        self.sent.lock().await.push(mail.clone());

        Ok(())
    }
}

/// Builds a small set of order-like records with `country` and `meta.device`
/// fields, suitable for grouping scenarios.
pub fn sample_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|n| {
            json!({
                "id": n,
                "country": if n % 2 == 0 { "US" } else { "FR" },
                "meta": { "device": if n % 3 == 0 { "mobile" } else { "desktop" } },
            })
        })
        .collect()
}
