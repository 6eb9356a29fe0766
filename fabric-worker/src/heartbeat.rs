//! The heartbeat task (spec §4.2.3) — fires every 10 s, independent of
//! the consumer pool.

use fabric_queue::QueueClient;
use fabric_types::ToolName;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fire interval. A hard contract: the health key's 30 s TTL gives a 3×
/// miss margin before a discoverer considers the tool dead.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Run the heartbeat loop until `cancel` fires. Heartbeat failures are
/// logged at debug level and never fatal (spec §7).
pub async fn run(queue: Arc<dyn QueueClient>, tool: ToolName, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                if let Err(err) = queue.heartbeat(&tool).await {
                    debug!(tool = %tool, error = %err, "heartbeat failed");
                }
            }
        }
    }
}
