use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use runavik::application::ports::EventStoreError;
use runavik::domain::Event;
use runavik::infrastructure::events::{decode_entry, encode_payload};

fn fields_from(pairs: Vec<(&'static str, String)>) -> HashMap<String, String> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn given_nested_payload_when_encoding_and_decoding_then_it_round_trips_losslessly() {
    let data = serde_json::json!({
        "id": "req-1",
        "url": "https://example.com/watch?v=abc",
        "nested": { "list": [1, 2, 3], "flag": true, "inner": { "deep": "value" } },
    });
    let mut event = Event::new("media_requested", data.clone());
    event.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap());

    let fields = fields_from(encode_payload(&event).unwrap());
    let decoded = decode_entry("media_requested", "7-0", &fields).unwrap();

    assert_eq!(decoded.name, "media_requested");
    assert_eq!(decoded.data, data);
    assert_eq!(decoded.timestamp, event.timestamp);
    assert_eq!(decoded.id.unwrap().as_str(), "7-0");
}

#[test]
fn given_event_without_timestamp_when_encoding_then_append_time_is_filled() {
    let event = Event::new("media_requested", serde_json::json!({"id": "x"}));

    let fields = fields_from(encode_payload(&event).unwrap());
    let decoded = decode_entry("media_requested", "1-0", &fields).unwrap();

    assert!(decoded.timestamp.is_some());
}

#[test]
fn given_missing_name_field_when_decoding_then_entry_is_malformed() {
    let mut fields = fields_from(
        encode_payload(&Event::new("s", serde_json::json!({}))).unwrap(),
    );
    fields.remove("name");

    let result = decode_entry("s", "1-0", &fields);

    assert!(matches!(
        result,
        Err(EventStoreError::MalformedEntry { .. })
    ));
}

#[test]
fn given_invalid_payload_json_when_decoding_then_entry_is_malformed_not_skipped() {
    let mut fields = fields_from(
        encode_payload(&Event::new("s", serde_json::json!({}))).unwrap(),
    );
    fields.insert("data".to_string(), "{not json".to_string());

    let error = decode_entry("s", "3-0", &fields).unwrap_err();

    match error {
        EventStoreError::MalformedEntry { stream, id, reason } => {
            assert_eq!(stream, "s");
            assert_eq!(id, "3-0");
            assert!(reason.contains("json"));
        }
        other => panic!("expected malformed entry, got {other:?}"),
    }
}

#[test]
fn given_unparseable_timestamp_when_decoding_then_entry_is_malformed() {
    let mut fields = fields_from(
        encode_payload(&Event::new("s", serde_json::json!({}))).unwrap(),
    );
    fields.insert("timestamp".to_string(), "yesterday".to_string());

    let result = decode_entry("s", "1-0", &fields);

    assert!(matches!(
        result,
        Err(EventStoreError::MalformedEntry { .. })
    ));
}
