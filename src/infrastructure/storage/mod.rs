mod local_store;
mod s3_store;
mod store_factory;

pub use local_store::LocalBlobStore;
pub use s3_store::S3BlobStore;
pub use store_factory::BlobStoreFactory;
