use serde::{Deserialize, Serialize};

use super::StoragePath;

/// One persisted, playable unit of a (possibly split) download. A request
/// yields 1..N parts; ordering is significant and encoded in the 1-indexed
/// part suffix of both the title and the storage path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPart {
    pub storage_path: StoragePath,
    pub display_title: String,
}
