use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::destination::base::Destination;
use crate::error::ExportResult;

#[derive(Debug, Default)]
struct Inner {
    artifacts: BTreeMap<String, Vec<u8>>,
}

/// In-memory destination for ephemeral or test data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full contents of the artifact stored under `key`.
    pub async fn artifact(&self, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().await;
        inner.artifacts.get(key).cloned()
    }

    /// Returns the keys of all artifacts written so far, in sorted order.
    pub async fn artifact_keys(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.artifacts.keys().cloned().collect()
    }
}

impl Destination for MemoryDestination {
    async fn put_chunk(&self, key: &str, chunk: Bytes) -> ExportResult<()> {
        let mut inner = self.inner.lock().await;

        debug!(key, chunk_len = chunk.len(), "appending chunk to memory artifact");

        inner
            .artifacts
            .entry(key.to_string())
            .or_default()
            .extend_from_slice(&chunk);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_append_in_order() {
        let destination = MemoryDestination::new();

        destination
            .put_chunk("export/a.jl", Bytes::from_static(b"one"))
            .await
            .unwrap();
        destination
            .put_chunk("export/a.jl", Bytes::from_static(b"two"))
            .await
            .unwrap();
        destination
            .put_chunk("export/b.jl", Bytes::from_static(b"three"))
            .await
            .unwrap();

        assert_eq!(
            destination.artifact("export/a.jl").await.unwrap(),
            b"onetwo"
        );
        assert_eq!(
            destination.artifact_keys().await,
            vec!["export/a.jl", "export/b.jl"]
        );
    }
}
