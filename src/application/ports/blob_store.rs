use async_trait::async_trait;

use crate::domain::StoragePath;

/// Byte-addressable read/write of named objects. Writes overwrite; both
/// operations are safe to call concurrently for disjoint paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn read(&self, path: &StoragePath) -> Result<Vec<u8>, BlobStoreError>;

    async fn write(&self, path: &StoragePath, data: &[u8]) -> Result<(), BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}
