//! An in-memory [`QueueClient`] used by tests and examples that don't
//! need a live Redis. Implements the same contract as
//! [`crate::redis_client::RedisQueueClient`] against a handful of
//! `tokio`-guarded in-process collections.

use crate::client::{QueueClient, ResultStream};
use crate::error::QueueError;
use crate::schema;
use async_trait::async_trait;
use fabric_types::{JobId, JobResult, ToolMeta, ToolName, WorkItem};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, Notify};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

/// Capacity of each per-job result broadcast channel. Generous: a job's
/// result is published exactly once in practice.
const RESULT_CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
struct State {
    queues: HashMap<String, VecDeque<WorkItem>>,
    notify: HashMap<String, Arc<Notify>>,
    channels: HashMap<String, broadcast::Sender<JobResult>>,
    tool_meta: HashMap<String, ToolMeta>,
    tools_available: HashSet<String>,
    worker_counts: HashMap<String, i64>,
}

/// A queue client backed entirely by in-process state. Safe to share
/// across tasks via `Arc`; every operation locks the shared state only
/// for the duration of the mutation.
pub struct MemoryQueueClient {
    state: Mutex<State>,
}

impl MemoryQueueClient {
    /// Construct an empty client.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }
}

impl Default for MemoryQueueClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueClient for MemoryQueueClient {
    async fn push(&self, cancel: &CancellationToken, item: &WorkItem) -> Result<(), QueueError> {
        item.validate()?;
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        let key = schema::queue_key(&item.tool);
        let mut state = self.state.lock().await;
        state.queues.entry(key.clone()).or_default().push_back(item.clone());
        state
            .notify
            .entry(key)
            .or_insert_with(|| Arc::new(Notify::new()))
            .notify_waiters();
        Ok(())
    }

    async fn pop(
        &self,
        cancel: &CancellationToken,
        tool: &ToolName,
    ) -> Result<Option<WorkItem>, QueueError> {
        let key = schema::queue_key(tool);
        loop {
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            // `Notify::notified()` snapshots the notification sequence at
            // construction time, so it must be created before we check the
            // queue: a push landing between the check and registering a
            // waiter would otherwise go unnoticed and this consumer would
            // park forever with an item sitting in the queue.
            let notify = {
                let mut state = self.state.lock().await;
                state
                    .notify
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Notify::new()))
                    .clone()
            };
            let notified = notify.notified();

            {
                let mut state = self.state.lock().await;
                if let Some(item) = state.queues.get_mut(&key).and_then(VecDeque::pop_front) {
                    return Ok(Some(item));
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = notified => continue,
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
        let state = self.state.lock().await;
        if let Some(sender) = state.channels.get(&channel) {
            // No live subscriber is not an error — the result is simply lost.
            let _ = sender.send(result.clone());
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        cancel: &CancellationToken,
        job_id: &JobId,
    ) -> Result<ResultStream, QueueError> {
        let channel = schema::results_channel(job_id);
        let mut state = self.state.lock().await;
        let sender = state
            .channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(RESULT_CHANNEL_CAPACITY).0)
            .clone();
        drop(state);

        let cancel = cancel.clone();
        let stream = BroadcastStream::new(sender.subscribe())
            .take_until(async move { cancel.cancelled().await })
            .filter_map(|item| item.ok());

        Ok(Box::pin(stream))
    }

    async fn register_tool(&self, meta: &ToolMeta) -> Result<(), QueueError> {
        meta.validate()?;
        let mut state = self.state.lock().await;
        state.tool_meta.insert(meta.name.clone(), meta.clone());
        state.tools_available.insert(meta.name.clone());
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolMeta>, QueueError> {
        let state = self.state.lock().await;
        Ok(state
            .tools_available
            .iter()
            .filter_map(|name| state.tool_meta.get(name).cloned())
            .collect())
    }

    async fn heartbeat(&self, _tool: &ToolName) -> Result<(), QueueError> {
        // No TTL semantics to model in-process; presence of a call is
        // sufficient for tests that only assert the call succeeds.
        Ok(())
    }

    async fn get_worker_count(&self, tool: &ToolName) -> Result<i64, QueueError> {
        let state = self.state.lock().await;
        Ok(state.worker_counts.get(tool.as_str()).copied().unwrap_or(0))
    }

    async fn increment_worker_count(&self, tool: &ToolName) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        *state.worker_counts.entry(tool.as_str().to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn decrement_worker_count(&self, tool: &ToolName) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        *state.worker_counts.entry(tool.as_str().to_string()).or_insert(0) -= 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        Ok(())
    }
}
