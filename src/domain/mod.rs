mod event;
mod media_request;
mod staged_part;
mod storage_path;
mod title;
mod transcription_record;

pub use event::{Event, EventId};
pub use media_request::MediaRequest;
pub use staged_part::StagedPart;
pub use storage_path::StoragePath;
pub use title::sanitize_title;
pub use transcription_record::TranscriptionRecord;
