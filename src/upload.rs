//! Artifact upload
//!
//! The pipeline hands each finished artifact to an [`Uploader`]. The S3
//! implementation computes the object key from the artifact's file name and
//! the configured prefix, checks credentials, and transfers the whole file.

use crate::artifact::ExportArtifact;
use crate::config::UploadTarget;
use crate::error::ExportError;
use async_trait::async_trait;
use table_export_file::{object_key, s3_uri, LocalFile, S3Client};

/// Location of an uploaded artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub bucket: String,
    pub key: String,
}

impl UploadedObject {
    pub fn uri(&self) -> String {
        s3_uri(&self.bucket, &self.key)
    }
}

/// Transfers a completed artifact to remote storage
///
/// Implementations must not retry; the first error ends the upload phase.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, artifact: &ExportArtifact) -> Result<UploadedObject, ExportError>;
}

/// Uploader for S3 and S3-compatible stores
pub struct S3Uploader {
    client: S3Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Uploader {
    pub async fn new(target: &UploadTarget) -> Result<Self, ExportError> {
        let client = S3Client::new(&target.s3).await?;
        Ok(Self {
            client,
            bucket: target.bucket.clone(),
            prefix: target.prefix.clone(),
        })
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn upload(&self, artifact: &ExportArtifact) -> Result<UploadedObject, ExportError> {
        let file = LocalFile::open(&artifact.path).await?;
        let key = object_key(self.prefix.as_deref(), file.file_name());

        self.client.upload(&self.bucket, &key, &file).await?;

        Ok(UploadedObject {
            bucket: self.bucket.clone(),
            key,
        })
    }
}
