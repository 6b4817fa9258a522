use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use runavik::application::ports::{EventHandler, EventStore, EventStoreError};
use runavik::domain::Event;
use runavik::infrastructure::events::{decode_entry, InMemoryEventStore};

const STREAM: &str = "media_requested";
const GROUP: &str = "transcriber";

fn store() -> Arc<InMemoryEventStore> {
    Arc::new(InMemoryEventStore::with_timings(
        Duration::from_millis(20),
        Duration::ZERO,
        10,
    ))
}

fn request(id: &str) -> Event {
    Event::new(STREAM, serde_json::json!({ "id": id, "url": "https://example.com" }))
}

struct RecordingHandler {
    seen: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }
}

struct FailingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl EventHandler for FailingHandler {
    async fn handle(&self, _event: Event) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("stage blew up")
    }
}

#[tokio::test]
async fn given_group_created_twice_when_ensuring_then_cursor_is_preserved() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    store.append(&request("req-1")).await.unwrap();

    let first = store.read_group(STREAM, GROUP, "c1").unwrap();
    assert_eq!(first.len(), 1);

    // Re-creating the group must be a no-op, not a cursor reset.
    store.ensure_group(STREAM, GROUP).await.unwrap();
    let second = store.read_group(STREAM, GROUP, "c1").unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn given_concurrent_group_creation_when_ensuring_then_no_call_errors() {
    let store = store();
    let a = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.ensure_group(STREAM, GROUP).await })
    };
    let b = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.ensure_group(STREAM, GROUP).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_missing_group_when_reading_then_it_is_a_read_error() {
    let store = store();

    let result = store.read_group(STREAM, GROUP, "c1");

    assert!(matches!(result, Err(EventStoreError::Read(_))));
}

#[tokio::test]
async fn given_appended_event_when_read_through_the_group_then_payload_round_trips() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    let payload = serde_json::json!({
        "id": "req-1",
        "url": "https://example.com",
        "nested": { "flags": [true, false] },
    });
    store
        .append(&Event::new(STREAM, payload.clone()))
        .await
        .unwrap();

    let entries = store.read_group(STREAM, GROUP, "c1").unwrap();
    let (id, fields) = &entries[0];
    let event = decode_entry(STREAM, id, fields).unwrap();

    assert_eq!(event.data, payload);
    assert_eq!(event.name, STREAM);
}

#[tokio::test]
async fn given_delivered_entry_when_not_acknowledged_then_it_stays_pending_for_one_consumer() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    store.append(&request("req-1")).await.unwrap();

    store.read_group(STREAM, GROUP, "c1").unwrap();

    let pending = store.pending_entries(STREAM, GROUP);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].1, "c1");
}

#[tokio::test]
async fn given_acknowledged_entry_when_acknowledged_again_then_store_state_is_unchanged() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    let id = store.append(&request("req-1")).await.unwrap();

    store.read_group(STREAM, GROUP, "c1").unwrap();
    store.ack(STREAM, GROUP, id.as_str()).unwrap();
    let after_first = store.pending_entries(STREAM, GROUP);

    store.ack(STREAM, GROUP, id.as_str()).unwrap();
    let after_second = store.pending_entries(STREAM, GROUP);

    assert!(after_first.is_empty());
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn given_crashed_consumer_when_another_claims_idle_entries_then_the_entry_is_redelivered() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    let id = store.append(&request("req-1")).await.unwrap();

    // First consumer receives the entry and "crashes" before acking.
    let delivered = store.read_group(STREAM, GROUP, "c1").unwrap();
    assert_eq!(delivered.len(), 1);

    let claimed = store.claim_idle(STREAM, GROUP, "c2").unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].0, id.as_str());

    let pending = store.pending_entries(STREAM, GROUP);
    assert_eq!(pending, vec![(id.as_str().to_string(), "c2".to_string())]);
}

#[tokio::test]
async fn given_failing_handler_when_consuming_then_loop_stops_and_entry_stays_pending() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    store.append(&request("req-1")).await.unwrap();

    let handler = Arc::new(FailingHandler {
        calls: AtomicUsize::new(0),
    });
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let result = store
        .consume(STREAM, GROUP, "c1", handler.clone(), shutdown_rx)
        .await;

    assert!(matches!(result, Err(EventStoreError::Handler { .. })));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.pending_entries(STREAM, GROUP).len(), 1);
}

#[tokio::test]
async fn given_pending_entry_from_a_crash_when_a_new_consumer_starts_then_it_processes_and_acks() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    store.append(&request("req-1")).await.unwrap();

    // Simulate delivery without acknowledgment.
    store.read_group(STREAM, GROUP, "c1").unwrap();
    assert_eq!(store.pending_entries(STREAM, GROUP).len(), 1);

    let handler = Arc::new(RecordingHandler::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consume = {
        let store = Arc::clone(&store);
        let handler = Arc::clone(&handler) as Arc<dyn EventHandler>;
        tokio::spawn(async move { store.consume(STREAM, GROUP, "c2", handler, shutdown_rx).await })
    };

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while handler.seen.lock().unwrap().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "entry never redelivered");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true).unwrap();

    consume.await.unwrap().unwrap();
    assert!(store.pending_entries(STREAM, GROUP).is_empty());
    assert_eq!(handler.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn given_shutdown_signal_when_consuming_then_loop_returns_cleanly() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();

    let handler = Arc::new(RecordingHandler::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consume = {
        let store = Arc::clone(&store);
        let handler = Arc::clone(&handler) as Arc<dyn EventHandler>;
        tokio::spawn(async move { store.consume(STREAM, GROUP, "c1", handler, shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(true).unwrap();

    consume.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_successful_handler_when_consuming_then_entries_are_acknowledged_in_order() {
    let store = store();
    store.ensure_group(STREAM, GROUP).await.unwrap();
    store.append(&request("req-1")).await.unwrap();
    store.append(&request("req-2")).await.unwrap();

    let handler = Arc::new(RecordingHandler::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consume = {
        let store = Arc::clone(&store);
        let handler = Arc::clone(&handler) as Arc<dyn EventHandler>;
        tokio::spawn(async move { store.consume(STREAM, GROUP, "c1", handler, shutdown_rx).await })
    };

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while handler.seen.lock().unwrap().len() < 2 {
        assert!(tokio::time::Instant::now() < deadline, "entries never consumed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true).unwrap();
    consume.await.unwrap().unwrap();

    let seen = handler.seen.lock().unwrap();
    let ids: Vec<&str> = seen.iter().map(|e| e.id.as_ref().unwrap().as_str()).collect();
    assert_eq!(ids, vec!["1-0", "2-0"]);
    assert!(store.pending_entries(STREAM, GROUP).is_empty());
}
