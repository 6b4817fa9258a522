use std::fmt;

use chrono::{DateTime, Utc};

/// One immutable entry on a named stream. The name identifies both the
/// event's semantic type and the stream it is appended to.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Assigned by the event store at append time; the unit of
    /// acknowledgment. `None` until the event has been appended.
    pub id: Option<EventId>,
    pub name: String,
    pub data: serde_json::Value,
    /// Filled by the store at append time when the producer left it unset.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Event {
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            data,
            timestamp: None,
        }
    }
}

/// Store-assigned, monotonically ordered entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
