//! [`WorkerRuntime`] — the lifecycle and shutdown state machine
//! (spec §4.2.1, §4.2.5, §4.2.6).

use crate::error::WorkerError;
use crate::handler::ToolHandler;
use crate::registry::TypeRegistry;
use crate::{consumer, heartbeat, worker_id};
use fabric_config::WorkerOptions;
use fabric_queue::{QueueClient, RedisQueueClient};
use fabric_types::{ToolMeta, ToolName};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Independent deadline for the deferred live-worker-counter decrement
/// during cleanup — separate from `ShutdownTimeout` so it still
/// completes after the main drain deadline elapses (spec §4.2.5 step 4).
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A long-lived per-tool worker process: one [`ToolHandler`] run
/// against `options.concurrency` consumers plus a heartbeat task.
///
/// Constructed with [`WorkerRuntime::new`]; `with_queue_client` lets
/// tests inject an in-memory transport and skip the connect step.
pub struct WorkerRuntime {
    handler: Arc<dyn ToolHandler>,
    registry: Arc<dyn TypeRegistry>,
    options: WorkerOptions,
    queue: Option<Arc<dyn QueueClient>>,
}

impl WorkerRuntime {
    /// Build a runtime for `handler`, decoding/encoding through
    /// `registry`, configured by `options` (see `fabric_config::resolve`).
    pub fn new(
        handler: Arc<dyn ToolHandler>,
        registry: Arc<dyn TypeRegistry>,
        options: WorkerOptions,
    ) -> Self {
        Self {
            handler,
            registry,
            options,
            queue: None,
        }
    }

    /// Inject a pre-built transport, skipping the connect step. Used by
    /// tests that run against [`fabric_queue::memory::MemoryQueueClient`].
    pub fn with_queue_client(mut self, queue: Arc<dyn QueueClient>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Run the startup sequence, serve steady state until `shutdown` is
    /// cancelled, then drain and clean up. `shutdown` is the operating
    /// context (spec §5) — callers that want OS-signal-driven shutdown
    /// should use [`Self::run_until_signal`] instead.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), WorkerError> {
        let worker_id = worker_id::mint();
        let tool = ToolName::new(self.handler.name().to_string());
        info!(worker_id = %worker_id, tool = %tool, "minted worker id");

        let queue: Arc<dyn QueueClient> = match self.queue {
            Some(queue) => queue,
            None => {
                let client = RedisQueueClient::connect(&self.options.transport_url)
                    .await
                    .map_err(WorkerError::Connect)?;
                Arc::new(client)
            }
        };
        info!(transport_url = %self.options.transport_url, "connected to transport");

        let meta = ToolMeta {
            name: self.handler.name().to_string(),
            version: self.handler.version().to_string(),
            description: self.handler.description().to_string(),
            schema: serde_json::Value::Null,
            tags: self.handler.tags().to_vec(),
            input_type: self.handler.input_type().to_string(),
            output_type: self.handler.output_type().to_string(),
            worker_count: 0,
        };
        queue
            .register_tool(&meta)
            .await
            .map_err(WorkerError::Register)?;
        info!(tool = %tool, "registered tool");

        if let Err(err) = queue.increment_worker_count(&tool).await {
            error!(tool = %tool, error = %err, "failed to increment live-worker counter");
        }

        let heartbeat_handle = tokio::spawn(heartbeat::run(
            queue.clone(),
            tool.clone(),
            shutdown.clone(),
        ));

        let mut consumer_handles = Vec::with_capacity(self.options.concurrency as usize);
        for _ in 0..self.options.concurrency {
            consumer_handles.push(tokio::spawn(consumer::run(
                queue.clone(),
                self.handler.clone(),
                self.registry.clone(),
                tool.clone(),
                worker_id.clone(),
                shutdown.clone(),
            )));
        }
        info!(concurrency = self.options.concurrency, "consumer pool started");

        shutdown.cancelled().await;
        info!(tool = %tool, "shutdown signal received, draining");

        let drain = futures::future::join_all(consumer_handles);
        if tokio::time::timeout(self.options.shutdown_timeout, drain)
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.options.shutdown_timeout.as_secs(),
                "shutdown timeout elapsed with consumers still draining"
            );
        }
        let _ = heartbeat_handle.await;

        if tokio::time::timeout(CLEANUP_TIMEOUT, queue.decrement_worker_count(&tool))
            .await
            .is_err()
        {
            error!(tool = %tool, "live-worker counter decrement timed out during cleanup");
        }

        if let Err(err) = queue.close().await {
            error!(error = %err, "failed to close transport");
        }

        Ok(())
    }

    /// Run with the operating context driven by the process's stop
    /// signals (spec §6): SIGTERM and SIGINT/Ctrl-C are treated
    /// identically as "initiate graceful shutdown".
    pub async fn run_until_signal(self) -> Result<(), WorkerError> {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            wait_for_stop_signal().await;
            trigger.cancel();
        });
        self.run(shutdown).await
    }
}

async fn wait_for_stop_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Exit status per spec §6: 0 on clean shutdown (including a
/// `ShutdownTimeout` that elapsed with work in flight), non-zero if the
/// startup sequence failed.
pub fn exit_code(result: &Result<(), WorkerError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
