//! Error types for the export run.

use std::path::PathBuf;
use table_export_file::UploadError;
use thiserror::Error;

/// Errors that can occur during an export run.
///
/// Only [`ExportError::TableNotFound`] is recoverable: the table is skipped
/// and the run continues. Every other variant ends the run.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A required setting is missing or a setting could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured table does not exist in the source schema.
    #[error("Table '{table}' does not exist in {database}")]
    TableNotFound { table: String, database: String },

    /// The database is unreachable, rejected the credentials, or failed a query.
    #[error("MySQL error: {0}")]
    Connection(#[from] mysql_async::Error),

    /// Local filesystem failure.
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Remote credentials are missing or incomplete.
    #[error("{0}")]
    Auth(String),

    /// The upload to the object store failed.
    #[error("{0}")]
    Transfer(String),

    /// None of the configured tables produced an artifact.
    #[error("No table was exported from {database} (configured: {configured}, skipped: {skipped})")]
    EmptyResult {
        database: String,
        configured: usize,
        skipped: usize,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the run may continue with the next table after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExportError::TableNotFound { .. })
    }

    /// Process exit code for a run that ended with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Config(_) => 1,
            ExportError::EmptyResult { .. } => 2,
            ExportError::TableNotFound { .. } | ExportError::Connection(_) => 3,
            ExportError::Io { .. } | ExportError::Csv(_) => 4,
            ExportError::Auth(_) => 5,
            ExportError::Transfer(_) => 6,
        }
    }
}

impl From<UploadError> for ExportError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingCredentials(_) => ExportError::Auth(err.to_string()),
            UploadError::Transfer { .. } => ExportError::Transfer(err.to_string()),
            UploadError::Io { path, source } => ExportError::Io { path, source },
        }
    }
}
