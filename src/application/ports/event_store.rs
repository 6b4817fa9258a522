use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::{Event, EventId};

/// Processes one delivered event. A handler error stops the consume loop
/// and leaves the entry pending, so handlers must tolerate being invoked
/// more than once for the same request.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: Event) -> anyhow::Result<()>;
}

/// A durable, ordered, replayable stream with at-least-once delivery to a
/// named consumer group.
///
/// Per-entry state machine: appended -> delivered (pending, owned by one
/// consumer) -> acknowledged, with idle pending entries reclaimed by another
/// consumer after a crash. Acknowledgment is idempotent.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably record `event` on the stream named `event.name`. The
    /// transport call can fail before or after commit, so callers must
    /// treat append as non-idempotent and not retry blindly without a
    /// dedup key upstream.
    async fn append(&self, event: &Event) -> Result<EventId, EventStoreError>;

    /// Idempotently create a consumer group starting at the beginning of
    /// the stream, creating the stream empty if absent. "Already exists"
    /// is success, including under concurrent calls from other processes.
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), EventStoreError>;

    /// Blocking consume loop: reclaim stale pending entries, read the next
    /// batch (blocking up to a bounded timeout), invoke the handler per
    /// entry, and acknowledge only after the handler succeeds. A handler
    /// or transport error stops the loop and propagates, leaving the entry
    /// pending for redelivery. Returns `Ok(())` only on shutdown.
    async fn consume(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        handler: Arc<dyn EventHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), EventStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    #[error("append failed: {0}")]
    Append(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("acknowledge failed: {0}")]
    Ack(String),
    #[error("group setup failed: {0}")]
    Group(String),
    #[error("malformed entry {id} on stream {stream}: {reason}")]
    MalformedEntry {
        stream: String,
        id: String,
        reason: String,
    },
    #[error("handler failed for entry {id}: {cause}")]
    Handler { id: String, cause: anyhow::Error },
}
