use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{
    StreamAutoClaimOptions, StreamAutoClaimReply, StreamId, StreamReadOptions, StreamReadReply,
};
use redis::AsyncCommands;
use tokio::sync::watch;

use crate::application::ports::{EventHandler, EventStore, EventStoreError};
use crate::domain::{Event, EventId};

use super::codec;

/// Redis Streams adapter: XADD for append, XGROUP CREATE for group setup,
/// XREADGROUP/XACK for the consume loop, and XAUTOCLAIM to take over
/// pending entries whose owner crashed.
pub struct RedisEventStore {
    conn: ConnectionManager,
    block_timeout_ms: u64,
    claim_min_idle_ms: u64,
    batch_size: usize,
}

impl RedisEventStore {
    pub async fn connect(
        url: &str,
        block_timeout_ms: u64,
        claim_min_idle_ms: u64,
        batch_size: usize,
    ) -> Result<Self, EventStoreError> {
        let client =
            redis::Client::open(url).map_err(|e| EventStoreError::Read(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| EventStoreError::Read(e.to_string()))?;
        Ok(Self {
            conn,
            block_timeout_ms,
            claim_min_idle_ms,
            batch_size,
        })
    }

    /// Take over entries that have been pending on another consumer longer
    /// than the idle threshold. This is what turns "pending after a crash"
    /// into actual redelivery.
    async fn claim_stale(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
    ) -> Result<Vec<StreamId>, EventStoreError> {
        let mut conn = self.conn.clone();
        let opts = StreamAutoClaimOptions::default().count(self.batch_size);
        let reply: StreamAutoClaimReply = conn
            .xautoclaim_options(
                stream,
                group,
                consumer,
                self.claim_min_idle_ms,
                "0-0",
                opts,
            )
            .await
            .map_err(|e| EventStoreError::Read(e.to_string()))?;
        Ok(reply.claimed)
    }

    async fn read_batch(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
    ) -> Result<Vec<StreamId>, EventStoreError> {
        let mut conn = self.conn.clone();
        let opts = StreamReadOptions::default()
            .group(group, consumer)
            .count(self.batch_size)
            .block(self.block_timeout_ms as usize);
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[stream], &[">"], &opts)
            .await
            .map_err(|e| EventStoreError::Read(e.to_string()))?;

        Ok(reply
            .map(|r| r.keys.into_iter().flat_map(|k| k.ids).collect())
            .unwrap_or_default())
    }

    /// Deliver one entry to the handler and acknowledge it only after the
    /// handler succeeds. A crash in between leaves the entry pending, which
    /// is exactly the at-least-once guarantee.
    async fn dispatch(
        &self,
        stream: &str,
        group: &str,
        entry: StreamId,
        handler: &Arc<dyn EventHandler>,
    ) -> Result<(), EventStoreError> {
        let fields = decode_fields(stream, &entry)?;
        let event = codec::decode_entry(stream, &entry.id, &fields)?;

        handler
            .handle(event)
            .await
            .map_err(|cause| EventStoreError::Handler {
                id: entry.id.clone(),
                cause,
            })?;

        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(stream, group, &[&entry.id])
            .await
            .map_err(|e| EventStoreError::Ack(e.to_string()))?;
        Ok(())
    }
}

fn decode_fields(stream: &str, entry: &StreamId) -> Result<HashMap<String, String>, EventStoreError> {
    let mut fields = HashMap::with_capacity(entry.map.len());
    for (key, value) in &entry.map {
        let text: String =
            redis::from_redis_value(value).map_err(|e| EventStoreError::MalformedEntry {
                stream: stream.to_string(),
                id: entry.id.clone(),
                reason: format!("field '{key}' is not a string: {e}"),
            })?;
        fields.insert(key.clone(), text);
    }
    Ok(fields)
}

#[async_trait]
impl EventStore for RedisEventStore {
    async fn append(&self, event: &Event) -> Result<EventId, EventStoreError> {
        let fields = codec::encode_payload(event)?;
        let mut conn = self.conn.clone();
        let id: String = conn
            .xadd(&event.name, "*", &fields)
            .await
            .map_err(|e| EventStoreError::Append(e.to_string()))?;
        Ok(EventId::new(id))
    }

    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), EventStoreError> {
        let mut conn = self.conn.clone();
        let result: Result<String, redis::RedisError> =
            conn.xgroup_create_mkstream(stream, group, "0").await;
        match result {
            Ok(_) => Ok(()),
            // Concurrent creation by another worker; the group exists,
            // which is what we asked for.
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(EventStoreError::Group(e.to_string())),
        }
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
        tracing::info!(stream, group, consumer, "Consume loop started");

        loop {
            if *shutdown.borrow_and_update() {
                tracing::info!(stream, group, consumer, "Consume loop stopping");
                return Ok(());
            }

            for entry in self.claim_stale(stream, group, consumer).await? {
                tracing::warn!(id = %entry.id, "Reclaimed stale pending entry");
                self.dispatch(stream, group, entry, &handler).await?;
            }

            let batch = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!(stream, group, consumer, "Consume loop stopping");
                        return Ok(());
                    }
                    continue;
                }
                batch = self.read_batch(stream, group, consumer) => batch?,
            };

            for entry in batch {
                self.dispatch(stream, group, entry, &handler).await?;
            }
        }
    }
}
