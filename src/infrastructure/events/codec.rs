use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::application::ports::EventStoreError;
use crate::domain::{Event, EventId};

pub const FIELD_NAME: &str = "name";
pub const FIELD_DATA: &str = "data";
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// Flatten an event into the transport envelope: the payload is serialized
/// as a JSON string inside the `data` field so arbitrary nesting
/// round-trips losslessly, and a missing timestamp is filled at append
/// time.
pub fn encode_payload(event: &Event) -> Result<Vec<(&'static str, String)>, EventStoreError> {
    let data = serde_json::to_string(&event.data)
        .map_err(|e| EventStoreError::Append(format!("payload serialization: {e}")))?;
    let timestamp = event.timestamp.unwrap_or_else(Utc::now).to_rfc3339();

    Ok(vec![
        (FIELD_NAME, event.name.clone()),
        (FIELD_DATA, data),
        (FIELD_TIMESTAMP, timestamp),
    ])
}

/// Rebuild an event from envelope fields. A missing or undecodable field
/// is a distinct malformed-entry error, never silently skipped: skipping
/// would silently drop work.
pub fn decode_entry(
    stream: &str,
    id: &str,
    fields: &HashMap<String, String>,
) -> Result<Event, EventStoreError> {
    let malformed = |reason: String| EventStoreError::MalformedEntry {
        stream: stream.to_string(),
        id: id.to_string(),
        reason,
    };

    let name = fields
        .get(FIELD_NAME)
        .ok_or_else(|| malformed(format!("missing field '{FIELD_NAME}'")))?;
    let raw_data = fields
        .get(FIELD_DATA)
        .ok_or_else(|| malformed(format!("missing field '{FIELD_DATA}'")))?;
    let data: serde_json::Value = serde_json::from_str(raw_data)
        .map_err(|e| malformed(format!("payload is not valid json: {e}")))?;

    let timestamp = fields
        .get(FIELD_TIMESTAMP)
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| malformed(format!("unparseable timestamp: {e}")))
        })
        .transpose()?;

    Ok(Event {
        id: Some(EventId::new(id)),
        name: name.clone(),
        data,
        timestamp,
    })
}
