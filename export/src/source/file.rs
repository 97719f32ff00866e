use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::{ErrorKind, ExportError, ExportResult};
use crate::export_error;
use crate::source::base::{Source, SourceFetch};
use crate::types::Checkpoint;

/// Checkpoint key under which the file source records the next line to read.
const LINE_KEY: &str = "line";

/// JSON-lines file source.
///
/// Positions are line offsets, so a restored checkpoint resumes at the first
/// line that was not part of a durably written batch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    exhausted: Arc<AtomicBool>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exhausted: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Source for FileSource {
    async fn fetch(&self, batch_size: usize, position: &Checkpoint) -> ExportResult<SourceFetch> {
        let start_line = position.offset(LINE_KEY).unwrap_or(0);

        let file = File::open(&self.path).await.map_err(|err| {
            export_error!(
                ErrorKind::SourceIoError,
                "Failed to open source file",
                format!("{}: {err}", self.path.display())
            )
        })?;
        let mut lines = BufReader::new(file).lines();

        // Skip lines covered by the position. Line offsets keep the checkpoint
        // cheap at the cost of a linear skip on resume.
        let mut line_number = 0u64;
        while line_number < start_line {
            if lines
                .next_line()
                .await
                .map_err(read_error(&self.path))?
                .is_none()
            {
                break;
            }
            line_number += 1;
        }

        let mut records = Vec::new();
        let mut reached_end = false;
        while records.len() < batch_size {
            match lines.next_line().await.map_err(read_error(&self.path))? {
                Some(line) => {
                    line_number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }

                    let record: Value = serde_json::from_str(&line).map_err(|err| {
                        export_error!(
                            ErrorKind::InvalidData,
                            "Malformed JSON line in source file",
                            format!("line {line_number}: {err}")
                        )
                    })?;
                    records.push(record);
                }
                None => {
                    reached_end = true;
                    break;
                }
            }
        }

        self.exhausted.store(reached_end, Ordering::SeqCst);

        debug!(
            path = %self.path.display(),
            start_line,
            fetched = records.len(),
            reached_end,
            "fetched records from file source"
        );

        let mut new_position = Checkpoint::new();
        new_position.insert(LINE_KEY, Value::from(line_number));

        Ok(SourceFetch {
            records,
            new_position,
        })
    }

    async fn is_exhausted(&self) -> ExportResult<bool> {
        Ok(self.exhausted.load(Ordering::SeqCst))
    }
}

fn read_error(path: &std::path::Path) -> impl Fn(std::io::Error) -> ExportError + '_ {
    move |err| {
        export_error!(
            ErrorKind::SourceIoError,
            "Failed to read source file",
            format!("{}: {err}", path.display())
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn write_lines(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn reads_json_lines_in_batches() {
        let file = write_lines(&[r#"{"n": 1}"#, r#"{"n": 2}"#, r#"{"n": 3}"#]);
        let source = FileSource::new(file.path());

        let first = source.fetch(2, &Checkpoint::new()).await.unwrap();
        assert_eq!(first.records, vec![json!({"n": 1}), json!({"n": 2})]);
        assert!(!source.is_exhausted().await.unwrap());

        let second = source.fetch(2, &first.new_position).await.unwrap();
        assert_eq!(second.records, vec![json!({"n": 3})]);
        assert!(source.is_exhausted().await.unwrap());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let file = write_lines(&[r#"{"n": 1}"#, "", r#"{"n": 2}"#]);
        let source = FileSource::new(file.path());

        let fetch = source.fetch(10, &Checkpoint::new()).await.unwrap();
        assert_eq!(fetch.records.len(), 2);
    }

    #[tokio::test]
    async fn malformed_line_is_a_non_transient_error() {
        let file = write_lines(&[r#"{"n": 1}"#, "not json"]);
        let source = FileSource::new(file.path());

        let err = source.fetch(10, &Checkpoint::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(!err.kind().is_transient());
    }

    #[tokio::test]
    async fn missing_file_is_a_transient_source_error() {
        let source = FileSource::new("/nonexistent/source.jl");

        let err = source.fetch(10, &Checkpoint::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceIoError);
    }
}
