//! Object storage destination for exported files
//!
//! This crate uploads finished local files to AWS S3 or any S3-compatible
//! store, and owns the rules for naming the uploaded objects.
//!
//! # Object keys
//!
//! An object key is the local file name, optionally placed under a prefix:
//! - prefix `exports/` + `users_20240101T000000Z.csv` -> `exports/users_20240101T000000Z.csv`
//! - no prefix (or an empty one) -> `users_20240101T000000Z.csv`
//!
//! # Example
//!
//! ```ignore
//! use table_export_file::{object_key, LocalFile, S3Client, S3Settings};
//!
//! let client = S3Client::new(&S3Settings::new("us-east-1")).await?;
//! let file = LocalFile::open("/app/out/users_20240101T000000Z.csv").await?;
//! let key = object_key(Some("exports"), file.file_name());
//! client.upload("my-bucket", &key, &file).await?;
//! ```

mod error;
mod local;
mod s3;

pub use error::UploadError;
pub use local::LocalFile;
pub use s3::{S3Client, S3Settings};

/// Compute the object key for a file name under an optional prefix.
///
/// Trailing `/` characters are stripped from the prefix before joining.
/// A prefix that is empty after stripping is treated as absent.
pub fn object_key(prefix: Option<&str>, file_name: &str) -> String {
    match prefix.map(|p| p.trim_end_matches('/')) {
        Some(p) if !p.is_empty() => format!("{p}/{file_name}"),
        _ => file_name.to_string(),
    }
}

/// Format an object location as an `s3://` URI for logging
pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}
