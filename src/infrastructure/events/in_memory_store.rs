use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::application::ports::{EventHandler, EventStore, EventStoreError};
use crate::domain::{Event, EventId};

use super::codec;

/// In-process event store implementing the same explicit per-entry state
/// machine as the Redis adapter: appended -> pending (owned by exactly one
/// consumer) -> acknowledged, with idle pending entries reclaimable by
/// another consumer. Entries round-trip through the same envelope codec as
/// the wire adapter, so payload fidelity is exercised too.
pub struct InMemoryEventStore {
    state: Mutex<State>,
    block_timeout: Duration,
    claim_min_idle: Duration,
    batch_size: usize,
}

#[derive(Default)]
struct State {
    streams: HashMap<String, StreamState>,
    groups: HashMap<(String, String), GroupState>,
}

#[derive(Default)]
struct StreamState {
    next_seq: u64,
    entries: Vec<EntryState>,
}

struct EntryState {
    id: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct GroupState {
    cursor: usize,
    pending: HashMap<String, Delivery>,
    acked: HashSet<String>,
}

struct Delivery {
    consumer: String,
    delivered_at: Instant,
}

type DeliveredEntry = (String, HashMap<String, String>);

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::with_timings(Duration::from_millis(100), Duration::from_secs(60), 10)
    }

    pub fn with_timings(
        block_timeout: Duration,
        claim_min_idle: Duration,
        batch_size: usize,
    ) -> Self {
        Self {
            state: Mutex::new(State::default()),
            block_timeout,
            claim_min_idle,
            batch_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("event store state poisoned")
    }

    /// Deliver the next undelivered entries to `consumer`, marking them
    /// pending. Errors when the group does not exist, mirroring NOGROUP.
    pub fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
    ) -> Result<Vec<DeliveredEntry>, EventStoreError> {
        let mut state = self.lock();
        let key = (stream.to_string(), group.to_string());
        if !state.groups.contains_key(&key) {
            return Err(EventStoreError::Read(format!(
                "no such group '{group}' on stream '{stream}'"
            )));
        }

        let available: Vec<DeliveredEntry> = state
            .streams
            .get(stream)
            .map(|s| {
                let cursor = state.groups[&key].cursor;
                s.entries
                    .iter()
                    .skip(cursor)
                    .take(self.batch_size)
                    .map(|e| (e.id.clone(), e.fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let group_state = state.groups.get_mut(&key).expect("group checked above");
        group_state.cursor += available.len();
        for (id, _) in &available {
            group_state.pending.insert(
                id.clone(),
                Delivery {
                    consumer: consumer.to_string(),
                    delivered_at: Instant::now(),
                },
            );
        }
        Ok(available)
    }

    /// Reassign pending entries idle beyond the threshold to `consumer`.
    pub fn claim_idle(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
    ) -> Result<Vec<DeliveredEntry>, EventStoreError> {
        let mut state = self.lock();
        let key = (stream.to_string(), group.to_string());
        if !state.groups.contains_key(&key) {
            return Err(EventStoreError::Read(format!(
                "no such group '{group}' on stream '{stream}'"
            )));
        }

        let now = Instant::now();
        let stale: Vec<String> = state.groups[&key]
            .pending
            .iter()
            .filter(|(_, d)| now.duration_since(d.delivered_at) >= self.claim_min_idle)
            .map(|(id, _)| id.clone())
            .collect();

        let mut claimed = Vec::new();
        for id in stale {
            let fields = state
                .streams
                .get(stream)
                .and_then(|s| s.entries.iter().find(|e| e.id == id))
                .map(|e| e.fields.clone());
            if let Some(fields) = fields {
                let group_state = state.groups.get_mut(&key).expect("group checked above");
                group_state.pending.insert(
                    id.clone(),
                    Delivery {
                        consumer: consumer.to_string(),
                        delivered_at: now,
                    },
                );
                claimed.push((id, fields));
            }
        }
        claimed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(claimed)
    }

    /// Acknowledge one entry. Idempotent: re-acking an already-acked or
    /// unknown id is a no-op, not an error.
    pub fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), EventStoreError> {
        let mut state = self.lock();
        let key = (stream.to_string(), group.to_string());
        if let Some(group_state) = state.groups.get_mut(&key) {
            if group_state.pending.remove(id).is_some() {
                group_state.acked.insert(id.to_string());
            }
        }
        Ok(())
    }

    /// Ids currently pending for the group, with their owning consumer.
    pub fn pending_entries(&self, stream: &str, group: &str) -> Vec<(String, String)> {
        let state = self.lock();
        let key = (stream.to_string(), group.to_string());
        let mut pending: Vec<(String, String)> = state
            .groups
            .get(&key)
            .map(|g| {
                g.pending
                    .iter()
                    .map(|(id, d)| (id.clone(), d.consumer.clone()))
                    .collect()
            })
            .unwrap_or_default();
        pending.sort();
        pending
    }

    pub fn stream_len(&self, stream: &str) -> usize {
        self.lock()
            .streams
            .get(stream)
            .map(|s| s.entries.len())
            .unwrap_or(0)
    }

    async fn dispatch(
        &self,
        stream: &str,
        group: &str,
        entry: DeliveredEntry,
        handler: &Arc<dyn EventHandler>,
    ) -> Result<(), EventStoreError> {
        let (id, fields) = entry;
        let event = codec::decode_entry(stream, &id, &fields)?;

        handler
            .handle(event)
            .await
            .map_err(|cause| EventStoreError::Handler {
                id: id.clone(),
                cause,
            })?;

        self.ack(stream, group, &id)
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &Event) -> Result<EventId, EventStoreError> {
        let fields: HashMap<String, String> = codec::encode_payload(event)?
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let mut state = self.lock();
        let stream = state.streams.entry(event.name.clone()).or_default();
        stream.next_seq += 1;
        let id = format!("{}-0", stream.next_seq);
        stream.entries.push(EntryState {
            id: id.clone(),
            fields,
        });
        Ok(EventId::new(id))
    }

    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), EventStoreError> {
        let mut state = self.lock();
        state.streams.entry(stream.to_string()).or_default();
        state
            .groups
            .entry((stream.to_string(), group.to_string()))
            .or_default();
        Ok(())
    }

    async fn consume(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        handler: Arc<dyn EventHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), EventStoreError> {
        let mut shutdown = shutdown;

        loop {
            if *shutdown.borrow_and_update() {
                return Ok(());
            }

            for entry in self.claim_idle(stream, group, consumer)? {
                self.dispatch(stream, group, entry, &handler).await?;
            }

            let batch = self.read_group(stream, group, consumer)?;
            if batch.is_empty() {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            return Ok(());
                        }
                    }
                    _ = tokio::time::sleep(self.block_timeout) => {}
                }
                continue;
            }

            for entry in batch {
                self.dispatch(stream, group, entry, &handler).await?;
            }
        }
    }
}
