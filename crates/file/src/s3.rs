//! S3 upload implementation

use crate::{LocalFile, UploadError};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

/// Connection settings for the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    /// AWS region the bucket lives in
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack, ...)
    pub endpoint_url: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
}

impl S3Settings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint_url: None,
            force_path_style: false,
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Shared S3 client for uploads
///
/// Creating an S3 client loads the AWS configuration chain, so one client
/// is created per run and reused for every upload.
pub struct S3Client {
    sdk_config: SdkConfig,
    client: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from the default AWS configuration chain
    ///
    /// This does not touch the network and does not resolve credentials yet.
    pub async fn new(settings: &S3Settings) -> Result<Self, UploadError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let Some(endpoint_url) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);

        Ok(Self { sdk_config, client })
    }

    /// Resolve credentials from the configured provider chain
    ///
    /// Missing or partially set credentials fail with
    /// [`UploadError::MissingCredentials`].
    pub async fn ensure_credentials(&self) -> Result<(), UploadError> {
        let provider = self.sdk_config.credentials_provider().ok_or_else(|| {
            UploadError::MissingCredentials("no credentials provider configured".to_string())
        })?;

        provider
            .provide_credentials()
            .await
            .map_err(|e| UploadError::MissingCredentials(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    /// Upload the full contents of a local file under `key`
    pub async fn upload(&self, bucket: &str, key: &str, file: &LocalFile) -> Result<(), UploadError> {
        self.ensure_credentials().await?;

        let body = ByteStream::from_path(file.path())
            .await
            .map_err(|e| UploadError::Io {
                path: file.path().to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        tracing::debug!(
            "Uploading {} ({} bytes) to s3://{}/{}",
            file.path().display(),
            file.len(),
            bucket,
            key
        );

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Transfer {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_builder() {
        let settings = S3Settings::new("eu-west-1")
            .with_endpoint_url(Some("http://localhost:9000".to_string()))
            .with_force_path_style(true);

        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(
            settings.endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(settings.force_path_style);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = S3Settings::new("us-east-1");
        assert_eq!(settings.endpoint_url, None);
        assert!(!settings.force_path_style);
    }

    // Upload round-trips need a reachable S3-compatible endpoint and are
    // covered through the uploader seam in the root crate instead
}
