//! A single consumer's loop (spec §4.2.2). The pool is `Concurrency`
//! copies of this same loop sharing the transport handle.

use crate::handler::ToolHandler;
use crate::process::process_work_item;
use crate::registry::TypeRegistry;
use fabric_queue::QueueClient;
use fabric_types::{ToolName, WorkerId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Run one consumer until `cancel` fires. Pop is the loop's only
/// suspension point; at most one handler invocation runs per consumer
/// at a time.
pub async fn run(
    queue: Arc<dyn QueueClient>,
    handler: Arc<dyn ToolHandler>,
    registry: Arc<dyn TypeRegistry>,
    tool: ToolName,
    worker_id: WorkerId,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let item = match queue.pop(&cancel, &tool).await {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(_) if cancel.is_cancelled() => return,
            Err(err) => {
                error!(tool = %tool, error = %err, "pop failed");
                continue;
            }
        };

        let result = process_work_item(&cancel, &item, handler.as_ref(), registry.as_ref(), &worker_id).await;

        if let Err(err) = queue.publish(&cancel, &result).await {
            error!(job_id = %result.job_id, error = %err, "publish failed");
        }
    }
}
