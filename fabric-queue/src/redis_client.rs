//! Redis-backed [`QueueClient`](crate::client::QueueClient).
//!
//! `BRPOP` has no native cancellation support, so `pop` polls it with a
//! short timeout and races the wait against the caller's
//! [`CancellationToken`] on every iteration.

use crate::client::{QueueClient, ResultStream};
use crate::error::QueueError;
use crate::schema::{self, TOOLS_AVAILABLE_KEY};
use async_trait::async_trait;
use fabric_types::{JobId, JobResult, ToolMeta, ToolName, WorkItem};
use redis::AsyncCommands;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Seconds each `BRPOP` call blocks for before `pop` re-checks
/// cancellation and tries again.
const POP_POLL_SECS: f64 = 1.0;

/// Depth of the channel buffering decoded results between the
/// subscriber forwarding task and [`QueueClient::subscribe`]'s caller.
const SUBSCRIBE_BUFFER: usize = 32;

/// A `QueueClient` backed by a Redis-compatible endpoint.
///
/// Cheap to clone: it wraps a `ConnectionManager`, which multiplexes a
/// single connection (reconnecting transparently) and is itself
/// designed to be shared across tasks.
pub struct RedisQueueClient {
    client: redis::Client,
    manager: redis::aio::ConnectionManager,
}

impl RedisQueueClient {
    /// Open a connection to `url` (e.g. `redis://localhost:6379`).
    /// Fatal on failure — per spec §4.2.1 step 3, this is a startup-fatal
    /// error for the worker runtime.
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { client, manager })
    }
}

#[async_trait]
impl QueueClient for RedisQueueClient {
    async fn push(&self, cancel: &CancellationToken, item: &WorkItem) -> Result<(), QueueError> {
        item.validate()?;
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        let key = schema::queue_key(&item.tool);
        let encoded = schema::encode_json(item)?;
        let mut conn = self.manager.clone();
        conn.lpush::<_, _, ()>(&key, encoded).await?;
        Ok(())
    }

    async fn pop(
        &self,
        cancel: &CancellationToken,
        tool: &ToolName,
    ) -> Result<Option<WorkItem>, QueueError> {
        let key = schema::queue_key(tool);
        let mut conn = self.manager.clone();
        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            let popped: Option<(String, String)> = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                res = conn.brpop(&key, POP_POLL_SECS) => res?,
            };
            match popped {
                Some((_, raw)) => return Ok(Some(schema::decode_json(&raw)?)),
                None => continue,
            }
        }
    }

    async fn publish(
        &self,
        _cancel: &CancellationToken,
        result: &JobResult,
    ) -> Result<(), QueueError> {
        result.validate()?;
        // Fire-and-forget per spec §4.1.2: publish broadcasts regardless of
        // the caller's operating context so a result produced right at
        // shutdown still reaches a live subscriber.
        let channel = schema::results_channel(&result.job_id);
        let encoded = schema::encode_json(result)?;
        let mut conn = self.manager.clone();
        conn.publish::<_, _, ()>(&channel, encoded).await?;
        Ok(())
    }

    async fn subscribe(
        &self,
        cancel: &CancellationToken,
        job_id: &JobId,
    ) -> Result<ResultStream, QueueError> {
        let channel = schema::results_channel(job_id);
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&channel).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(SUBSCRIBE_BUFFER);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            loop {
                let msg = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    msg = stream.next() => msg,
                };
                let Some(msg) = msg else { break };
                let Ok(payload) = msg.get_payload::<String>() else {
                    continue;
                };
                let Ok(result) = schema::decode_json::<JobResult>(&payload) else {
                    continue;
                };
                if tx.send(result).await.is_err() {
                    break;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn register_tool(&self, meta: &ToolMeta) -> Result<(), QueueError> {
        meta.validate()?;
        let tool = ToolName::new(meta.name.clone());
        let key = schema::meta_key(&tool);
        let fields = schema::tool_meta_to_map(meta)?;
        let items: Vec<(String, String)> = fields.into_iter().collect();
        let mut conn = self.manager.clone();
        conn.hset_multiple::<_, _, _, ()>(&key, &items).await?;
        conn.sadd::<_, _, ()>(TOOLS_AVAILABLE_KEY, meta.name.clone())
            .await?;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolMeta>, QueueError> {
        let mut conn = self.manager.clone();
        let names: Vec<String> = conn.smembers(TOOLS_AVAILABLE_KEY).await?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let tool = ToolName::new(name);
            let key = schema::meta_key(&tool);
            let map: std::collections::HashMap<String, String> = conn.hgetall(&key).await?;
            match schema::tool_meta_from_map(&map) {
                Some(meta) => out.push(meta),
                None => error!(tool = %tool, "skipping undecodable tool meta record"),
            }
        }
        Ok(out)
    }

    async fn heartbeat(&self, tool: &ToolName) -> Result<(), QueueError> {
        let key = schema::health_key(tool);
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(&key, schema::HEARTBEAT_VALUE, schema::HEARTBEAT_TTL_SECS)
            .await?;
        Ok(())
    }

    async fn get_worker_count(&self, tool: &ToolName) -> Result<i64, QueueError> {
        let key = schema::workers_key(tool);
        let mut conn = self.manager.clone();
        let count: Option<i64> = conn.get(&key).await?;
        Ok(count.unwrap_or(0))
    }

    async fn increment_worker_count(&self, tool: &ToolName) -> Result<(), QueueError> {
        let key = schema::workers_key(tool);
        let mut conn = self.manager.clone();
        conn.incr::<_, _, ()>(&key, 1).await?;
        Ok(())
    }

    async fn decrement_worker_count(&self, tool: &ToolName) -> Result<(), QueueError> {
        let key = schema::workers_key(tool);
        let mut conn = self.manager.clone();
        conn.decr::<_, _, ()>(&key, 1).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        // ConnectionManager has no explicit close; releasing the last
        // clone drops the connection. This is a no-op so repeated calls
        // stay idempotent per spec §4.1.2.
        Ok(())
    }
}
