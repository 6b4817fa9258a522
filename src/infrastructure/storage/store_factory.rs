use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::config::{StorageProviderSetting, StorageSettings};

use super::local_store::LocalBlobStore;
use super::s3_store::S3BlobStore;

pub struct BlobStoreFactory;

impl BlobStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn BlobStore>, BlobStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = LocalBlobStore::new(path)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::S3 => {
                let bucket = settings.s3_bucket.as_deref().ok_or_else(|| {
                    BlobStoreError::WriteFailed("s3_bucket required".into())
                })?;
                let access_key = settings.s3_access_key.as_deref().ok_or_else(|| {
                    BlobStoreError::WriteFailed("s3_access_key required".into())
                })?;
                let secret_key = settings.s3_secret_key.as_deref().ok_or_else(|| {
                    BlobStoreError::WriteFailed("s3_secret_key required".into())
                })?;
                let store = S3BlobStore::new(
                    settings.s3_endpoint.as_deref(),
                    &settings.s3_region,
                    bucket,
                    access_key,
                    secret_key,
                    settings.s3_allow_http,
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}
