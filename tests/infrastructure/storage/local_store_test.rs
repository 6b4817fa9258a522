use runavik::application::ports::{BlobStore, BlobStoreError};
use runavik::domain::StoragePath;
use runavik::infrastructure::storage::LocalBlobStore;

fn create_test_store() -> (tempfile::TempDir, LocalBlobStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalBlobStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_written_object_when_reading_then_bytes_are_identical() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::staged_part("req-1", None, "Some Title", "mp4");
    let content = b"some media bytes";

    store.write(&path, content).await.unwrap();
    let fetched = store.read(&path).await.unwrap();

    assert_eq!(fetched, content);
}

#[tokio::test]
async fn given_existing_object_when_writing_again_then_content_is_overwritten() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::transcript("Some Title.mp4");

    store.write(&path, b"first transcript").await.unwrap();
    store.write(&path, b"second transcript").await.unwrap();

    let fetched = store.read(&path).await.unwrap();
    assert_eq!(fetched, b"second transcript");
}

#[tokio::test]
async fn given_nonexistent_path_when_reading_then_not_found_is_distinct() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::from_raw("req-9:missing.mp4");

    let result = store.read(&path).await;

    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_disjoint_paths_when_writing_concurrently_then_both_objects_land() {
    let (_dir, store) = create_test_store();
    let store = std::sync::Arc::new(store);
    let first_path = StoragePath::from_raw("req-1:a.mp4");
    let second_path = StoragePath::from_raw("req-2:b.mp4");

    let first = {
        let store = std::sync::Arc::clone(&store);
        let path = first_path.clone();
        tokio::spawn(async move { store.write(&path, b"first").await })
    };
    let second = {
        let store = std::sync::Arc::clone(&store);
        let path = second_path.clone();
        tokio::spawn(async move { store.write(&path, b"second").await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(store.read(&first_path).await.unwrap(), b"first");
    assert_eq!(store.read(&second_path).await.unwrap(), b"second");
}
