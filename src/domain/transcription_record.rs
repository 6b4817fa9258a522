use serde::{Deserialize, Serialize};

use super::StoragePath;

/// One persisted transcript; 1:1 per staged part, or many:1 when a part had
/// to be re-split before transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRecord {
    pub display_title: String,
    pub storage_path: StoragePath,
}
