use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::error::StoreError;
use crate::store::ArtifactStore;

/// Configuration for connecting to an S3-compatible endpoint (AWS, MinIO,
/// Ceph RGW — anything speaking the S3 API over a custom endpoint URL).
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// MinIO/Ceph deployments are usually path-style; real AWS is virtual-hosted.
    pub force_path_style: bool,
}

pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub async fn new(config: S3Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "panelcam-store",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);

        if let Some(endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        let client = Client::from_conf(builder.build());
        Self { client, bucket: config.bucket }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(e.to_string())
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn stat(&self, key: &str) -> Result<u64, StoreError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(e.to_string())
                }
            })?;
        Ok(output.content_length().unwrap_or(0).max(0) as u64)
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let presign_config = PresigningConfig::expires_in(ttl).map_err(|e| StoreError::Backend(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }

    async fn presign_put(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let presign_config = PresigningConfig::expires_in(ttl).map_err(|e| StoreError::Backend(e.to_string()))?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }

    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        let result = self.client.create_bucket().bucket(&self.bucket).send().await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let already_owned = e
                    .as_service_error()
                    .map(|se| se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists())
                    .unwrap_or(false);
                if already_owned {
                    tracing::debug!(bucket = %self.bucket, "bucket already exists, treating as success");
                    Ok(())
                } else {
                    Err(StoreError::Backend(e.to_string()))
                }
            }
        }
    }
}
