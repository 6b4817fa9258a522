use std::sync::Arc;

use crate::application::ports::{
    AudioProfile, BlobStore, BlobStoreError, TranscodeError, Transcoder, TranscriptionEngine,
    TranscriptionError,
};
use crate::domain::{StagedPart, StoragePath, TranscriptionRecord};

/// Stage two of the pipeline: fetch each staged part, re-encode it to the
/// transcription service's accepted profile, split again by fixed duration
/// if it still exceeds the service ceiling, and persist every transcript
/// the moment it is received.
pub struct TranscribeStage {
    blob_store: Arc<dyn BlobStore>,
    transcoder: Arc<dyn Transcoder>,
    engine: Arc<dyn TranscriptionEngine>,
    profile: AudioProfile,
    max_request_bytes: u64,
}

impl TranscribeStage {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        transcoder: Arc<dyn Transcoder>,
        engine: Arc<dyn TranscriptionEngine>,
        profile: AudioProfile,
        max_request_bytes: u64,
    ) -> Self {
        Self {
            blob_store,
            transcoder,
            engine,
            profile,
            max_request_bytes,
        }
    }

    pub async fn run(
        &self,
        parts: &[StagedPart],
    ) -> Result<Vec<TranscriptionRecord>, TranscribeError> {
        let mut records = Vec::new();

        for part in parts {
            let scratch = tempfile::tempdir()?;
            let raw = scratch.path().join("part.bin");

            let data = self.blob_store.read(&part.storage_path).await?;
            tokio::fs::write(&raw, &data).await?;

            let audio = scratch
                .path()
                .join(format!("audio.{}", self.profile.extension));
            self.transcoder
                .reencode(&raw, &audio, &self.profile)
                .await?;

            let size = tokio::fs::metadata(&audio)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            if size == 0 {
                return Err(TranscribeError::EmptyArtifact(part.display_title.clone()));
            }

            if size <= self.max_request_bytes {
                let audio_data = tokio::fs::read(&audio).await?;
                let text = self.engine.transcribe(&audio_data).await?;
                records.push(self.persist(&part.display_title, &text).await?);
                continue;
            }

            // The re-encode fixed the bitrate, so a fixed duration now maps
            // to a fixed size; leave headroom for container overhead.
            let chunk_secs = (self.max_request_bytes as f64 * 8.0)
                / (self.profile.bitrate_kbps as f64 * 1000.0)
                * 0.95;
            tracing::debug!(
                title = %part.display_title,
                bytes = size,
                chunk_secs,
                "Re-encoded part exceeds request ceiling, segmenting"
            );
            let chunks = self
                .transcoder
                .segment(&audio, chunk_secs, scratch.path(), "chunk")
                .await?;

            let stem = part
                .display_title
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(&part.display_title);
            for (index, chunk) in chunks.iter().enumerate() {
                let chunk_data = tokio::fs::read(chunk).await?;
                if chunk_data.is_empty() {
                    continue;
                }
                let text = self.engine.transcribe(&chunk_data).await?;
                let display = format!("{stem}-chunk{}.{}", index + 1, self.profile.extension);
                records.push(self.persist(&display, &text).await?);
            }
        }

        Ok(records)
    }

    /// Transcripts are persisted one at a time, immediately: a late failure
    /// in part N must not lose transcripts for parts 1..N-1.
    async fn persist(
        &self,
        display_title: &str,
        text: &str,
    ) -> Result<TranscriptionRecord, TranscribeError> {
        let storage_path = StoragePath::transcript(display_title);
        self.blob_store
            .write(&storage_path, text.as_bytes())
            .await?;
        tracing::info!(path = %storage_path, chars = text.len(), "Persisted transcript");
        Ok(TranscriptionRecord {
            display_title: display_title.to_string(),
            storage_path,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("storage: {0}")]
    Storage(#[from] BlobStoreError),
    #[error("transcode: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("empty artifact after re-encode: {0}")]
    EmptyArtifact(String),
    #[error("scratch io: {0}")]
    Io(#[from] std::io::Error),
}
