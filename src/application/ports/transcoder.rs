use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Target codec/bitrate for the transcription service's accepted input.
#[derive(Debug, Clone)]
pub struct AudioProfile {
    pub codec: String,
    pub extension: String,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u32,
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self {
            codec: "libmp3lame".to_string(),
            extension: "mp3".to_string(),
            bitrate_kbps: 32,
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// The external transcoding tool, as four distinct operations with
/// distinct argument shapes.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Total duration of the file in seconds.
    async fn probe_duration(&self, input: &Path) -> Result<f64, TranscodeError>;

    /// Cut a time range in stream-copy mode (no re-encode).
    async fn cut(
        &self,
        input: &Path,
        start_secs: f64,
        duration_secs: f64,
        output: &Path,
    ) -> Result<(), TranscodeError>;

    /// Re-encode to the target codec/bitrate profile.
    async fn reencode(
        &self,
        input: &Path,
        output: &Path,
        profile: &AudioProfile,
    ) -> Result<(), TranscodeError>;

    /// Segment into consecutive fixed-duration pieces, returning the
    /// produced files in order.
    async fn segment(
        &self,
        input: &Path,
        segment_secs: f64,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Vec<PathBuf>, TranscodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable media metadata: {0}")]
    BadMetadata(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
