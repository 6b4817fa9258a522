mod blob_store;
mod event_store;
mod media_extractor;
mod transcoder;
mod transcription_engine;

pub use blob_store::{BlobStore, BlobStoreError};
pub use event_store::{EventHandler, EventStore, EventStoreError};
pub use media_extractor::{ExtractionError, MediaExtractor, MediaMetadata, QualityProfile};
pub use transcoder::{AudioProfile, TranscodeError, Transcoder};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
