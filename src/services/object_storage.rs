// src/services/object_storage.rs
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read upload body: {0}")]
    Body(String),

    #[error("put object failed: {0}")]
    Put(String),
}

/// Blob store addressed by key within a single bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: &Path,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Builds a client from the ambient AWS credentials chain for `region`.
    pub async fn new(bucket: String, region: String) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: Client::new(&shared),
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        body: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let stream = ByteStream::from_path(body)
            .await
            .map_err(|e| StorageError::Body(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(stream)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Put(e.to_string()))?;

        log::debug!("Stored s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
