//! Local file handle for uploads

use crate::UploadError;
use std::path::{Path, PathBuf};

/// A local regular file that is ready to be uploaded
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    file_name: String,
    len: u64,
}

impl LocalFile {
    /// Open a local file and capture its name and size
    ///
    /// Fails if the path does not exist, is not a regular file, or has no
    /// UTF-8 file name.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| UploadError::Io {
                path: path.clone(),
                source,
            })?;

        if !metadata.is_file() {
            return Err(UploadError::Io {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ),
            });
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| UploadError::Io {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file name is missing or not valid UTF-8",
                ),
            })?;

        Ok(Self {
            path,
            file_name,
            len: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the object name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size in bytes at the time the file was opened
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
