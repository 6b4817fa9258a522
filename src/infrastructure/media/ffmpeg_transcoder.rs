use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{AudioProfile, TranscodeError, Transcoder};

/// Drives `ffmpeg`/`ffprobe` as subprocesses. All four operations capture
/// stderr so a non-zero exit carries the tool's diagnostic output.
pub struct FfmpegTranscoder {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }

    async fn run(&self, program: &str, args: Vec<String>) -> Result<Output, TranscodeError> {
        let output = Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::CommandFailed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

fn path_arg(path: &Path) -> Result<String, TranscodeError> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        TranscodeError::BadMetadata(format!("path is not valid utf-8: {}", path.display()))
    })
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe_duration(&self, input: &Path) -> Result<f64, TranscodeError> {
        let args = vec![
            "-i".to_string(),
            path_arg(input)?,
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-v".to_string(),
            "quiet".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
        ];
        let output = self.run(&self.ffprobe, args).await?;

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        text.parse::<f64>().map_err(|_| {
            TranscodeError::BadMetadata(format!(
                "unparseable duration {:?} for {}",
                text,
                input.display()
            ))
        })
    }

    async fn cut(
        &self,
        input: &Path,
        start_secs: f64,
        duration_secs: f64,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            format!("{start_secs:.3}"),
            "-i".to_string(),
            path_arg(input)?,
            "-t".to_string(),
            format!("{duration_secs:.3}"),
            "-c".to_string(),
            "copy".to_string(),
            "-y".to_string(),
            path_arg(output)?,
        ];
        self.run(&self.ffmpeg, args).await?;
        Ok(())
    }

    async fn reencode(
        &self,
        input: &Path,
        output: &Path,
        profile: &AudioProfile,
    ) -> Result<(), TranscodeError> {
        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            path_arg(input)?,
            "-vn".to_string(),
            "-codec:a".to_string(),
            profile.codec.clone(),
            "-b:a".to_string(),
            format!("{}k", profile.bitrate_kbps),
            "-ar".to_string(),
            profile.sample_rate.to_string(),
            "-ac".to_string(),
            profile.channels.to_string(),
            "-y".to_string(),
            path_arg(output)?,
        ];
        self.run(&self.ffmpeg, args).await?;
        Ok(())
    }

    async fn segment(
        &self,
        input: &Path,
        segment_secs: f64,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Vec<PathBuf>, TranscodeError> {
        let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("mp3");
        let pattern = output_dir.join(format!("{stem}-%03d.{ext}"));
        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            path_arg(input)?,
            "-f".to_string(),
            "segment".to_string(),
            "-segment_time".to_string(),
            format!("{segment_secs:.3}"),
            "-c".to_string(),
            "copy".to_string(),
            "-y".to_string(),
            path_arg(&pattern)?,
        ];
        self.run(&self.ffmpeg, args).await?;

        let prefix = format!("{stem}-");
        let suffix = format!(".{ext}");
        let mut produced = Vec::new();
        let mut dir = tokio::fs::read_dir(output_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(&suffix) {
                produced.push(entry.path());
            }
        }
        produced.sort();
        Ok(produced)
    }
}
