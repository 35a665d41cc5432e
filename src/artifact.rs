//! CSV artifacts
//!
//! This module turns a table's batch stream into one CSV file per table,
//! named `<table>_<run timestamp>.csv`, and can parse such files back.

mod escape;
mod format;
mod reader;
mod writer;

pub use escape::{escape_field, split_records};
pub use format::{parse_delimiter, single_byte, CsvFormat, LineTerminator, QuoteMode, QUOTE};
pub use reader::{read_artifact, ParsedArtifact};
pub use writer::{ArtifactWriter, WrittenFile, DEFAULT_BUFFER_SIZE};

use crate::error::ExportError;
use crate::source::BatchStream;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Format of the run-wide timestamp embedded in artifact names
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A completed local CSV file for one table
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub table: String,
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
    pub batches: u64,
    pub duration: Duration,
}

impl ExportArtifact {
    /// Final path component
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Format the run timestamp shared by every artifact of one run
pub fn run_timestamp(now: DateTime<Utc>) -> String {
    now.format(RUN_TIMESTAMP_FORMAT).to_string()
}

/// Deterministic artifact path: `<output_dir>/<table>_<run_timestamp>.csv`
pub fn artifact_path(output_dir: &Path, table: &str, run_timestamp: &str) -> PathBuf {
    output_dir.join(format!("{table}_{run_timestamp}.csv"))
}

/// Drain a batch stream into a single CSV file
///
/// Batches are pulled one at a time and appended in order. The returned
/// artifact's row count is the sum of the batch lengths.
pub async fn export_stream(
    stream: &mut (dyn BatchStream + '_),
    table: &str,
    path: &Path,
    format: CsvFormat,
) -> Result<ExportArtifact, ExportError> {
    let started = Instant::now();
    let mut writer = ArtifactWriter::create(path, format)?;
    let mut batches = 0u64;

    while let Some(batch) = stream.next_batch().await? {
        writer.write_batch(&batch)?;
        batches += 1;
        debug!(
            "Table {}: batch {} ({} rows, {} total)",
            table,
            batches,
            batch.len(),
            writer.rows_written()
        );
    }

    let written = writer.finish(stream.columns())?;

    Ok(ExportArtifact {
        table: table.to_string(),
        path: path.to_path_buf(),
        rows: written.rows,
        bytes: written.bytes,
        batches,
        duration: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(run_timestamp(now), "20240101T000000Z");

        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 7).unwrap();
        assert_eq!(run_timestamp(now), "20251231T235907Z");
    }

    #[test]
    fn test_artifact_path() {
        let path = artifact_path(Path::new("/app/out"), "users", "20240101T000000Z");
        assert_eq!(path, PathBuf::from("/app/out/users_20240101T000000Z.csv"));
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = ExportArtifact {
            table: "users".to_string(),
            path: PathBuf::from("/app/out/users_20240101T000000Z.csv"),
            rows: 0,
            bytes: 0,
            batches: 0,
            duration: Duration::ZERO,
        };
        assert_eq!(artifact.file_name(), Some("users_20240101T000000Z.csv"));
    }
}
