use std::path::PathBuf;
use std::sync::Arc;

use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::StoragePath;

pub struct LocalBlobStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalBlobStore {
    pub fn new(base_path: PathBuf) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| BlobStoreError::WriteFailed(e.to_string()))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| BlobStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
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
