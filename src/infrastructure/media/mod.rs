mod ffmpeg_transcoder;
mod ytdlp_extractor;

pub use ffmpeg_transcoder::FfmpegTranscoder;
pub use ytdlp_extractor::YtDlpExtractor;
