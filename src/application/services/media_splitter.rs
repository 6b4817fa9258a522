use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{TranscodeError, Transcoder};

/// Fraction by which a produced segment may exceed the byte ceiling.
/// Stream-copy cuts land on keyframe boundaries, so exact sizes are not
/// achievable; anything beyond this is a splitter defect.
pub const SIZE_TOLERANCE: f64 = 0.05;

/// Splits a staged media file into consecutive segments that each respect
/// a hard byte ceiling, using the external transcoding tool as the cutting
/// primitive.
pub struct MediaSplitter {
    transcoder: Arc<dyn Transcoder>,
}

impl MediaSplitter {
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self { transcoder }
    }

    /// Returns the ordered segment paths. A file already under the ceiling
    /// is returned untouched without invoking the transcoder at all.
    pub async fn split(&self, input: &Path, max_bytes: u64) -> Result<Vec<PathBuf>, SplitError> {
        let size = tokio::fs::metadata(input)
            .await
            .map_err(|_| SplitError::MissingInput(input.display().to_string()))?
            .len();
        if size == 0 {
            return Err(SplitError::EmptyInput(input.display().to_string()));
        }
        if size <= max_bytes {
            return Ok(vec![input.to_path_buf()]);
        }

        let total_secs = self.transcoder.probe_duration(input).await?;
        if total_secs <= 0.0 {
            return Err(SplitError::ZeroDuration(input.display().to_string()));
        }

        // Seconds of media that fit in max_bytes at the file's average rate.
        let target_secs = total_secs / size as f64 * max_bytes as f64;

        let dir = input.parent().unwrap_or_else(|| Path::new("."));
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("segment");
        let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("mp4");

        tracing::debug!(
            bytes = size,
            duration_secs = total_secs,
            segment_secs = target_secs,
            "Splitting oversized media file"
        );

        let mut segments = Vec::new();
        let mut offset = 0.0_f64;
        let mut part = 1_usize;

        while offset < total_secs {
            let output = dir.join(format!("{stem}-part{part}.{ext}"));
            self.transcoder
                .cut(input, offset, target_secs, &output)
                .await?;

            let produced = tokio::fs::metadata(&output)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            if produced == 0 {
                // End of stream; discard the trailing empty artifact.
                let _ = tokio::fs::remove_file(&output).await;
                break;
            }

            // Advance by the real segment duration, not the requested one,
            // so rounding never accumulates across many segments.
            let produced_secs = self.transcoder.probe_duration(&output).await?;
            if produced_secs <= 0.0 {
                let _ = tokio::fs::remove_file(&output).await;
                break;
            }

            segments.push(output);
            offset += produced_secs;
            part += 1;
        }

        Ok(segments)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("input file missing: {0}")]
    MissingInput(String),
    #[error("input file is empty: {0}")]
    EmptyInput(String),
    #[error("input has zero duration: {0}")]
    ZeroDuration(String),
    #[error("transcode: {0}")]
    Transcode(#[from] TranscodeError),
}
