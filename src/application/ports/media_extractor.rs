use std::path::Path;

use async_trait::async_trait;

/// Format selection for the extraction tool. Defaults to the
/// smallest-available audio rendition to bound bandwidth and storage.
#[derive(Debug, Clone)]
pub struct QualityProfile {
    pub format_selector: String,
    pub container: String,
}

impl Default for QualityProfile {
    fn default() -> Self {
        Self {
            format_selector: "worstaudio/worst".to_string(),
            container: "mp4".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaMetadata {
    pub title: String,
}

/// Stages remote media to a local path. The extraction logic itself is an
/// external collaborator; it is never reimplemented here.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(
        &self,
        url: &str,
        output: &Path,
        quality: &QualityProfile,
    ) -> Result<MediaMetadata, ExtractionError>;
}

/// Any extraction failure (unreachable source, invalid URL, geo-block,
/// tool failure) surfaces as this one kind; retry policy belongs to the
/// at-least-once redelivery mechanism, not to this port.
#[derive(Debug, thiserror::Error)]
#[error("extraction failed: {0}")]
pub struct ExtractionError(pub String);
