mod download_stage;
mod media_splitter;
mod pipeline;
mod transcribe_stage;

pub use download_stage::{DownloadError, DownloadStage};
pub use media_splitter::{MediaSplitter, SplitError, SIZE_TOLERANCE};
pub use pipeline::{PipelineError, TranscriptionPipeline};
pub use transcribe_stage::{TranscribeError, TranscribeStage};
