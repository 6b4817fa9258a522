use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{ExtractionError, MediaExtractor, MediaMetadata, QualityProfile};

/// Stages remote media by invoking `yt-dlp` as a subprocess. `-j` together
/// with `--no-simulate` downloads the file and prints the source metadata
/// as JSON on stdout in one invocation.
pub struct YtDlpExtractor {
    program: String,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(
        &self,
        url: &str,
        output: &Path,
        quality: &QualityProfile,
    ) -> Result<MediaMetadata, ExtractionError> {
        let output_arg = output
            .to_str()
            .ok_or_else(|| ExtractionError("output path is not valid utf-8".to_string()))?;

        tracing::debug!(url, format = %quality.format_selector, "Invoking media extractor");
        let result = Command::new(&self.program)
            .arg("--no-warnings")
            .arg("-f")
            .arg(&quality.format_selector)
            .arg("--merge-output-format")
            .arg(&quality.container)
            .arg("-o")
            .arg(output_arg)
            .arg("-j")
            .arg("--no-simulate")
            .arg(url)
            .output()
            .await
            .map_err(|e| ExtractionError(format!("failed to run {}: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExtractionError(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        let info: serde_json::Value = serde_json::from_slice(&result.stdout)
            .map_err(|e| ExtractionError(format!("metadata was not valid json: {e}")))?;
        let title = info
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(MediaMetadata { title })
    }
}
