use std::fmt;

use serde::{Deserialize, Serialize};

/// Deterministic object key. Determinism is what makes re-runs of the same
/// request idempotent: a redelivered job overwrites its own artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    /// Key for one staged download part: `{request_id}[-part{n}]:{title}.{ext}`.
    /// The part suffix is present only when the download was split.
    pub fn staged_part(request_id: &str, part: Option<usize>, title: &str, ext: &str) -> Self {
        match part {
            Some(n) => Self(format!("{request_id}-part{n}:{title}.{ext}")),
            None => Self(format!("{request_id}:{title}.{ext}")),
        }
    }

    /// Key for a persisted transcript.
    pub fn transcript(display_title: &str) -> Self {
        Self(format!("transcription:{display_title}"))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
