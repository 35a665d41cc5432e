//! Export run orchestration
//!
//! A run moves through `Validating -> Exporting -> Uploading -> Done`:
//!
//! 1. The output directory is created if needed.
//! 2. Every configured table is checked and exported in order. Missing
//!    tables are skipped with a warning; any other error ends the run.
//! 3. If no table was exported the run fails without uploading anything.
//! 4. Artifacts are uploaded in the order their tables were configured.
//!    The first failed upload ends the run.

use crate::artifact::{artifact_path, export_stream, ExportArtifact};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::source::TableSource;
use crate::upload::{UploadedObject, Uploader};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Phase a run is in, or ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Validating,
    Exporting,
    Uploading,
    Done,
}

/// Everything a run produced so far
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_timestamp: String,
    pub phase: RunPhase,
    /// Artifacts in configured table order
    pub exported: Vec<ExportArtifact>,
    /// Tables skipped because they do not exist
    pub skipped: Vec<String>,
    /// Uploaded objects, parallel to the first entries of `exported`
    pub uploaded: Vec<UploadedObject>,
}

impl RunReport {
    pub fn new(run_timestamp: impl Into<String>) -> Self {
        Self {
            run_timestamp: run_timestamp.into(),
            phase: RunPhase::Validating,
            exported: Vec::new(),
            skipped: Vec::new(),
            uploaded: Vec::new(),
        }
    }

    pub fn total_rows(&self) -> u64 {
        self.exported.iter().map(|a| a.rows).sum()
    }
}

/// Create the output directory and any missing parents
pub fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))
}

/// Local preparation done before any connection is opened
///
/// An unwritable output directory fails the run here, ahead of database
/// or network errors.
pub fn prepare(config: &ExportConfig, report: &mut RunReport) -> Result<(), ExportError> {
    report.phase = RunPhase::Exporting;
    ensure_output_dir(&config.output_dir)
}

/// Export one table to its artifact
///
/// Fails with [`ExportError::TableNotFound`] when the table is absent.
pub async fn export_table<S: TableSource + ?Sized>(
    config: &ExportConfig,
    source: &mut S,
    table: &str,
) -> Result<ExportArtifact, ExportError> {
    if !source.table_exists(table).await? {
        return Err(ExportError::TableNotFound {
            table: table.to_string(),
            database: source.database().to_string(),
        });
    }

    let path = artifact_path(&config.output_dir, table, &config.run_timestamp);
    let mut stream = source.open_table(table, config.batch_size).await?;
    export_stream(stream.as_mut(), table, &path, config.csv).await
}

/// Export every configured table, skipping missing ones
pub async fn export_tables<S: TableSource + ?Sized>(
    config: &ExportConfig,
    source: &mut S,
    report: &mut RunReport,
) -> Result<(), ExportError> {
    prepare(config, report)?;

    for table in &config.tables {
        match export_table(config, source, table).await {
            Ok(artifact) => {
                info!(
                    "Exported {} -> {} ({} rows)",
                    table,
                    artifact.path.display(),
                    artifact.rows
                );
                report.exported.push(artifact);
            }
            Err(e) if e.is_recoverable() => {
                warn!("{e}, skipping");
                report.skipped.push(table.clone());
            }
            Err(e) => return Err(e),
        }
    }

    if report.exported.is_empty() {
        return Err(ExportError::EmptyResult {
            database: source.database().to_string(),
            configured: config.tables.len(),
            skipped: report.skipped.len(),
        });
    }

    if !report.skipped.is_empty() {
        warn!(
            "{} of {} configured tables were skipped: {}",
            report.skipped.len(),
            config.tables.len(),
            report.skipped.join(", ")
        );
    }

    Ok(())
}

/// Upload every exported artifact in order, stopping at the first failure
pub async fn upload_artifacts<U: Uploader + ?Sized>(
    config: &ExportConfig,
    uploader: &U,
    report: &mut RunReport,
) -> Result<(), ExportError> {
    report.phase = RunPhase::Uploading;

    for artifact in &report.exported {
        if config.dry_run {
            info!(
                "Dry run: would upload {} to bucket '{}'",
                artifact.path.display(),
                config.upload.bucket
            );
            continue;
        }

        let object = uploader.upload(artifact).await?;
        info!("Uploaded {} -> {}", artifact.table, object.uri());
        report.uploaded.push(object);
    }

    Ok(())
}

/// Run the full export: export all tables, then upload all artifacts
pub async fn run<S, U>(
    config: &ExportConfig,
    source: &mut S,
    uploader: &U,
    report: &mut RunReport,
) -> Result<(), ExportError>
where
    S: TableSource + ?Sized,
    U: Uploader + ?Sized,
{
    export_tables(config, source, report).await?;
    upload_artifacts(config, uploader, report).await?;

    report.phase = RunPhase::Done;
    info!(
        "Export completed: {} tables, {} rows, {} uploaded",
        report.exported.len(),
        report.total_rows(),
        report.uploaded.len()
    );
    Ok(())
}
