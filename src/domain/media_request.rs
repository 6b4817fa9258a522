use serde::{Deserialize, Serialize};

use super::Event;

/// The unit of work. The id is caller-supplied and correlates every
/// artifact produced downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub id: String,
    pub url: String,
}

impl MediaRequest {
    pub fn from_event(event: &Event) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event.data.clone())
    }
}
