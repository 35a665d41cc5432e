//! Error types for uploads.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while uploading a file.
#[derive(Error, Debug)]
pub enum UploadError {
    /// No credentials could be resolved, or only part of them were set.
    #[error("AWS credentials not found or incomplete: {0}")]
    MissingCredentials(String),

    /// The store rejected the request or the transport failed.
    #[error("Failed to upload to s3://{bucket}/{key}: {message}")]
    Transfer {
        bucket: String,
        key: String,
        message: String,
    },

    /// The local file could not be read.
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
