//! Uploader that records calls instead of transferring anything

use crate::artifact::ExportArtifact;
use crate::error::ExportError;
use crate::upload::{UploadedObject, Uploader};
use async_trait::async_trait;
use std::sync::Mutex;
use table_export_file::{object_key, LocalFile};

/// Error to return from a chosen upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Auth,
    Transfer,
}

/// Records every upload attempt, optionally failing the n-th one
#[derive(Debug, Default)]
pub struct RecordingUploader {
    bucket: String,
    prefix: Option<String>,
    fail_at: Option<(usize, InjectedFailure)>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingUploader {
    pub fn new(bucket: impl Into<String>, prefix: Option<&str>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.map(str::to_string),
            fail_at: None,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Fail the attempt with zero-based index `index`
    pub fn failing_at(mut self, index: usize, failure: InjectedFailure) -> Self {
        self.fail_at = Some((index, failure));
        self
    }

    /// Tables of every attempted upload, in order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Uploader for RecordingUploader {
    async fn upload(&self, artifact: &ExportArtifact) -> Result<UploadedObject, ExportError> {
        let index = {
            let mut attempts = self
                .attempts
                .lock()
                .map_err(|e| ExportError::Transfer(e.to_string()))?;
            attempts.push(artifact.table.clone());
            attempts.len() - 1
        };

        match self.fail_at {
            Some((at, InjectedFailure::Auth)) if at == index => {
                return Err(ExportError::Auth("no credentials configured".to_string()));
            }
            Some((at, InjectedFailure::Transfer)) if at == index => {
                return Err(ExportError::Transfer(format!(
                    "upload of {} was rejected",
                    artifact.path.display()
                )));
            }
            _ => {}
        }

        let file = LocalFile::open(&artifact.path).await?;
        Ok(UploadedObject {
            bucket: self.bucket.clone(),
            key: object_key(self.prefix.as_deref(), file.file_name()),
        })
    }
}
