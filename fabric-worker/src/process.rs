//! `ProcessWorkItem` (spec §4.2.4) — decode, dispatch, encode, and
//! always produce a well-formed [`JobResult`].

use crate::handler::ToolHandler;
use crate::registry::TypeRegistry;
use fabric_types::{JobResult, WorkItem, WorkerId};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Run `item` through `handler`, producing a [`JobResult`] on every
/// path — decode failure, handler error, handler panic, and encode
/// failure all become a failure result rather than propagating.
pub async fn process_work_item(
    cancel: &CancellationToken,
    item: &WorkItem,
    handler: &dyn ToolHandler,
    registry: &dyn TypeRegistry,
    worker_id: &WorkerId,
) -> JobResult {
    let started_at = now_millis();

    let fail = |error: String, started_at: i64| {
        JobResult::failure(
            item.job_id.clone(),
            item.index,
            item.output_type.clone(),
            worker_id.clone(),
            started_at,
            now_millis().max(started_at),
            error,
        )
    };

    if !registry.is_registered(&item.input_type) {
        return fail(format!("unknown input type: {}", item.input_type), started_at);
    }

    let input = match registry.decode(&item.input_type, &item.input_bytes) {
        Ok(value) => value,
        Err(reason) => {
            return fail(format!("failed to unmarshal input: {reason}"), started_at);
        }
    };

    let outcome = AssertUnwindSafe(handler.execute_binary(cancel, input))
        .catch_unwind()
        .await;

    let output = match outcome {
        Ok(Ok(output)) => output,
        Ok(Err(reason)) => return fail(reason, started_at),
        Err(panic) => {
            let message = panic_message(&panic);
            return fail(format!("handler panicked: {message}"), started_at);
        }
    };

    let output_bytes = match registry.encode(&item.output_type, &output) {
        Ok(bytes) => bytes,
        Err(reason) => {
            return fail(format!("failed to marshal output: {reason}"), started_at);
        }
    };

    JobResult::success(
        item.job_id.clone(),
        item.index,
        item.output_type.clone(),
        worker_id.clone(),
        started_at,
        now_millis().max(started_at),
        output_bytes,
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
