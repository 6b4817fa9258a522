use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::StoragePath;

/// S3-compatible object storage; the endpoint override makes this work
/// against MinIO and other self-hosted backends.
pub struct S3BlobStore {
    inner: Arc<dyn ObjectStore>,
}

impl S3BlobStore {
    pub fn new(
        endpoint: Option<&str>,
        region: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        allow_http: bool,
    ) -> Result<Self, BlobStoreError> {
        let mut builder = AmazonS3Builder::new()
            .with_region(region)
            .with_bucket_name(bucket)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_allow_http(allow_http);
        if let Some(endpoint) = endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| BlobStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(store),
        })
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>, BlobStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => BlobStoreError::NotFound(path.to_string()),
            other => BlobStoreError::ReadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| BlobStoreError::ReadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, path: &StoragePath, data: &[u8]) -> Result<(), BlobStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data.to_vec()))
            .await
            .map_err(|e| BlobStoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}
