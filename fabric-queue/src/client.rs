//! The `QueueClient` trait (spec §4.1.2) — the one surface the worker
//! runtime and submitters use. Implementations never expose the raw
//! key/channel schema to callers.

use crate::error::QueueError;
use async_trait::async_trait;
use fabric_types::{JobResult, ToolMeta, ToolName, WorkItem};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

/// A live, possibly-empty stream of results delivered to a subscriber.
/// Finite: ends when the operating context is cancelled or the
/// transport link closes. Not restartable.
pub type ResultStream = std::pin::Pin<Box<dyn Stream<Item = JobResult> + Send>>;

/// A typed wrapper around a key-value + pub/sub transport that defines
/// the wire schema, validates messages, and exposes the primitives the
/// worker runtime and submitters build on.
///
/// Every method takes an explicit [`CancellationToken`] — the operating
/// context — rather than relying on ambient task-local cancellation.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Validate and push `item` onto its tool's queue (head-push).
    /// Rejects locally without a transport call if `item` is invalid.
    async fn push(&self, cancel: &CancellationToken, item: &WorkItem) -> Result<(), QueueError>;

    /// Block until an item is available on `tool`'s queue (tail-pop) or
    /// `cancel` fires. Returns `Ok(None)` only when the transport itself
    /// reports no item without a hard failure; a cancelled context
    /// surfaces as [`QueueError::Cancelled`].
    async fn pop(
        &self,
        cancel: &CancellationToken,
        tool: &ToolName,
    ) -> Result<Option<WorkItem>, QueueError>;

    /// Validate and fire-and-forget broadcast `result` on
    /// `results:<result.job_id>`. A result published with no live
    /// subscriber is silently lost. Delivers regardless of `cancel`'s
    /// state — a result produced right as the operating context is
    /// cancelled (e.g. during shutdown drain) must still go out.
    async fn publish(
        &self,
        cancel: &CancellationToken,
        result: &JobResult,
    ) -> Result<(), QueueError>;

    /// Subscribe to the per-job result channel for `job_id`. Items
    /// published before this call completes are not replayed. Invalid
    /// payloads are silently dropped, never surfaced as stream errors.
    async fn subscribe(
        &self,
        cancel: &CancellationToken,
        job_id: &fabric_types::JobId,
    ) -> Result<ResultStream, QueueError>;

    /// Validate, then overwrite `tool:<meta.name>:meta` and add
    /// `meta.name` to `tools:available`. Idempotent.
    async fn register_tool(&self, meta: &ToolMeta) -> Result<(), QueueError>;

    /// One record per name in `tools:available`; entries whose meta is
    /// missing or undecodable are silently skipped.
    async fn list_tools(&self) -> Result<Vec<ToolMeta>, QueueError>;

    /// Write `"ok"` to `tool:<name>:health` with a 30 s TTL, refreshing
    /// it on every call.
    async fn heartbeat(&self, tool: &ToolName) -> Result<(), QueueError>;

    /// Current live-worker count for `tool`. Returns 0 if the counter
    /// does not exist.
    async fn get_worker_count(&self, tool: &ToolName) -> Result<i64, QueueError>;

    /// Atomically increment `tool`'s live-worker counter.
    async fn increment_worker_count(&self, tool: &ToolName) -> Result<(), QueueError>;

    /// Atomically decrement `tool`'s live-worker counter. Underflow is
    /// allowed; the client does not clamp at zero.
    async fn decrement_worker_count(&self, tool: &ToolName) -> Result<(), QueueError>;

    /// Idempotent release of transport resources.
    async fn close(&self) -> Result<(), QueueError>;
}
