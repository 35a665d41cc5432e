//! JSON run report
//!
//! Written once at the end of a run when `--emit-metrics` is set, whether the
//! run succeeded or not. Failing to write it never changes the exit code.

use crate::error::ExportError;
use crate::pipeline::{RunPhase, RunReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// One exported table
#[derive(Debug, Serialize)]
pub struct TableMetrics {
    pub table: String,
    pub path: String,
    pub rows: u64,
    pub bytes: u64,
    pub batches: u64,
    pub elapsed_secs: f64,
    pub key: Option<String>,
}

/// The whole report document
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub run_timestamp: String,
    pub status: RunStatus,
    pub phase: RunPhase,
    pub error: Option<String>,
    pub exit_code: i32,
    pub elapsed_secs: f64,
    pub total_rows: u64,
    pub tables: Vec<TableMetrics>,
    pub skipped: Vec<String>,
}

impl MetricsReport {
    pub fn from_run(report: &RunReport, outcome: Result<(), &ExportError>, elapsed: Duration) -> Self {
        let tables = report
            .exported
            .iter()
            .enumerate()
            .map(|(index, artifact)| TableMetrics {
                table: artifact.table.clone(),
                path: artifact.path.display().to_string(),
                rows: artifact.rows,
                bytes: artifact.bytes,
                batches: artifact.batches,
                elapsed_secs: artifact.duration.as_secs_f64(),
                key: report.uploaded.get(index).map(|o| o.key.clone()),
            })
            .collect();

        let (status, error, exit_code) = match outcome {
            Ok(()) => (RunStatus::Succeeded, None, 0),
            Err(e) => (RunStatus::Failed, Some(e.to_string()), e.exit_code()),
        };

        Self {
            run_timestamp: report.run_timestamp.clone(),
            status,
            phase: report.phase,
            error,
            exit_code,
            elapsed_secs: elapsed.as_secs_f64(),
            total_rows: report.total_rows(),
            tables,
            skipped: report.skipped.clone(),
        }
    }

    /// Serialize the report to `path`, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        Ok(())
    }
}

/// Write the report, logging instead of failing
pub fn emit(path: &Path, report: &MetricsReport) {
    match report.write(path) {
        Ok(()) => info!("Run report written to {}", path.display()),
        Err(e) => warn!("{e:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ExportArtifact;
    use crate::upload::UploadedObject;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_report() -> RunReport {
        let mut report = RunReport::new("20240101T000000Z");
        report.phase = RunPhase::Uploading;
        for (table, rows) in [("users", 3), ("orders", 5)] {
            report.exported.push(ExportArtifact {
                table: table.to_string(),
                path: PathBuf::from(format!("/out/{table}_20240101T000000Z.csv")),
                rows,
                bytes: 100,
                batches: 1,
                duration: Duration::from_millis(250),
            });
        }
        report.uploaded.push(UploadedObject {
            bucket: "b".to_string(),
            key: "users_20240101T000000Z.csv".to_string(),
        });
        report.skipped.push("missing".to_string());
        report
    }

    #[test]
    fn test_failed_run_report() {
        let report = sample_report();
        let err = ExportError::Transfer("boom".to_string());
        let metrics = MetricsReport::from_run(&report, Err(&err), Duration::from_secs(2));

        assert_eq!(metrics.status, RunStatus::Failed);
        assert_eq!(metrics.exit_code, 6);
        assert_eq!(metrics.phase, RunPhase::Uploading);
        assert_eq!(metrics.total_rows, 8);
        assert_eq!(metrics.tables[0].key.as_deref(), Some("users_20240101T000000Z.csv"));
        assert_eq!(metrics.tables[1].key, None);
        assert_eq!(metrics.skipped, vec!["missing".to_string()]);
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let metrics = MetricsReport::from_run(&sample_report(), Ok(()), Duration::from_secs(1));
        metrics.write(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["status"], "succeeded");
        assert_eq!(parsed["exit_code"], 0);
        assert_eq!(parsed["phase"], "uploading");
        assert_eq!(parsed["tables"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_report_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("report.json");
        let metrics = MetricsReport::from_run(&sample_report(), Ok(()), Duration::from_secs(1));
        let err = metrics.write(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to write run report"));
    }
}
