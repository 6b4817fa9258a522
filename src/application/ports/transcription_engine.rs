use async_trait::async_trait;

/// Converts a bounded audio byte buffer into text. The maximum accepted
/// payload size is supplied as configuration, not discovered at runtime.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}
