use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::destination::base::Destination;
use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;

/// Local filesystem destination.
///
/// Artifact keys map to paths below the configured root directory; chunks are
/// appended, so durability follows the filesystem's append semantics.
#[derive(Debug, Clone)]
pub struct FsDestination {
    root: PathBuf,
}

impl FsDestination {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn artifact_path(&self, key: &str) -> ExportResult<PathBuf> {
        // Destination keys are derived from group membership values, which are
        // arbitrary source data. Reject path traversal instead of escaping root.
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, std::path::Component::ParentDir))
        {
            return Err(export_error!(
                ErrorKind::InvalidData,
                "Artifact key is not a valid relative path",
                key
            ));
        }

        Ok(self.root.join(relative))
    }
}

impl Destination for FsDestination {
    async fn put_chunk(&self, key: &str, chunk: Bytes) -> ExportResult<()> {
        let path = self.artifact_path(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                export_error!(
                    ErrorKind::DestinationIoError,
                    "Failed to create artifact directory",
                    format!("{}: {err}", parent.display())
                )
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|err| {
                export_error!(
                    ErrorKind::DestinationIoError,
                    "Failed to open artifact for appending",
                    format!("{}: {err}", path.display())
                )
            })?;

        file.write_all(&chunk).await.map_err(|err| {
            export_error!(
                ErrorKind::DestinationIoError,
                "Failed to append chunk to artifact",
                format!("{}: {err}", path.display())
            )
        })?;
        file.flush().await.map_err(|err| {
            export_error!(
                ErrorKind::DestinationIoError,
                "Failed to flush artifact",
                format!("{}: {err}", path.display())
            )
        })?;

        debug!(key, chunk_len = chunk.len(), "appended chunk to fs artifact");

        Ok(())
    }
}
