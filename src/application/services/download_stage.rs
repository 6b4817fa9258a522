use std::sync::Arc;

use crate::application::ports::{
    BlobStore, BlobStoreError, ExtractionError, MediaExtractor, QualityProfile, Transcoder,
};
use crate::domain::{sanitize_title, MediaRequest, StagedPart, StoragePath};

use super::media_splitter::{MediaSplitter, SplitError};

/// Stage one of the pipeline: stage the remote media locally, split it
/// under the byte ceiling, and persist every part to the blob store under
/// a deterministic key.
pub struct DownloadStage {
    extractor: Arc<dyn MediaExtractor>,
    splitter: MediaSplitter,
    blob_store: Arc<dyn BlobStore>,
    quality: QualityProfile,
    max_part_bytes: u64,
}

impl DownloadStage {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        transcoder: Arc<dyn Transcoder>,
        blob_store: Arc<dyn BlobStore>,
        quality: QualityProfile,
        max_part_bytes: u64,
    ) -> Self {
        Self {
            extractor,
            splitter: MediaSplitter::new(transcoder),
            blob_store,
            quality,
            max_part_bytes,
        }
    }

    pub async fn run(&self, request: &MediaRequest) -> Result<Vec<StagedPart>, DownloadError> {
        // One private scratch directory per invocation, removed on every
        // exit path when the guard drops.
        let scratch = tempfile::tempdir()?;
        let staged = scratch
            .path()
            .join(format!("source.{}", self.quality.container));

        tracing::debug!(request_id = %request.id, url = %request.url, "Staging remote media");
        let metadata = self
            .extractor
            .extract(&request.url, &staged, &self.quality)
            .await?;

        let size = tokio::fs::metadata(&staged)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(DownloadError::EmptyArtifact(
                "staged download missing or empty".to_string(),
            ));
        }

        let title = sanitize_title(&metadata.title);
        let parts = self.splitter.split(&staged, self.max_part_bytes).await?;
        let multi = parts.len() > 1;
        let ext = &self.quality.container;

        let mut staged_parts = Vec::with_capacity(parts.len());
        for (index, path) in parts.iter().enumerate() {
            let content = tokio::fs::read(path).await?;
            if content.is_empty() {
                continue;
            }

            let part_number = if multi { Some(index + 1) } else { None };
            let storage_path = StoragePath::staged_part(&request.id, part_number, &title, ext);
            let display_title = match part_number {
                Some(n) => format!("{title}-part{n}.{ext}"),
                None => format!("{title}.{ext}"),
            };

            self.blob_store.write(&storage_path, &content).await?;
            tracing::info!(
                path = %storage_path,
                bytes = content.len(),
                "Persisted staged part"
            );
            staged_parts.push(StagedPart {
                storage_path,
                display_title,
            });
        }

        if staged_parts.is_empty() {
            return Err(DownloadError::EmptyArtifact(
                "no valid files produced".to_string(),
            ));
        }
        Ok(staged_parts)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("empty artifact: {0}")]
    EmptyArtifact(String),
    #[error("splitting: {0}")]
    Split(#[from] SplitError),
    #[error("storage: {0}")]
    Storage(#[from] BlobStoreError),
    #[error("scratch io: {0}")]
    Io(#[from] std::io::Error),
}
