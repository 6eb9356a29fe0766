//! Key and channel schema (spec §4.1.1) and wire encoding (spec §4.1.3).
//!
//! The `tool:` prefix is reserved — nothing outside this module
//! constructs these keys directly.

use crate::error::QueueError;
use fabric_types::{JobId, ToolMeta, ToolName};
use std::collections::HashMap;

/// `tool:<name>:queue` — ordered list of pending work items.
pub fn queue_key(tool: &ToolName) -> String {
    format!("tool:{tool}:queue")
}

/// `tool:<name>:meta` — the `ToolMeta` record, as a flat hash.
pub fn meta_key(tool: &ToolName) -> String {
    format!("tool:{tool}:meta")
}

/// `tool:<name>:health` — heartbeat liveness sentinel, 30s TTL.
pub fn health_key(tool: &ToolName) -> String {
    format!("tool:{tool}:health")
}

/// `tool:<name>:workers` — live-worker count for `<name>`.
pub fn workers_key(tool: &ToolName) -> String {
    format!("tool:{tool}:workers")
}

/// `tools:available` — set of discoverable tool names.
pub const TOOLS_AVAILABLE_KEY: &str = "tools:available";

/// `results:<job_id>` — per-job result delivery channel.
pub fn results_channel(job_id: &JobId) -> String {
    format!("results:{job_id}")
}

/// Heartbeat sentinel value and its key TTL, per spec §4.1.2.
pub const HEARTBEAT_VALUE: &str = "ok";
/// TTL in seconds for the heartbeat key.
pub const HEARTBEAT_TTL_SECS: u64 = 30;

/// Encode a `WorkItem`/`JobResult` as the structured text representation
/// the wire schema specifies: JSON with the Rust field names (already
/// snake_case, so no renaming is needed to satisfy "stable field names").
pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, QueueError> {
    serde_json::to_string(value).map_err(|e| QueueError::Encoding(e.to_string()))
}

/// Decode a `WorkItem`/`JobResult` from its structured text representation.
pub fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, QueueError> {
    serde_json::from_str(raw).map_err(|e| QueueError::Encoding(e.to_string()))
}

/// Flatten a `ToolMeta` into the field-name -> string map the wire
/// schema specifies: `tags` is stored as a serialized JSON array,
/// `worker_count` as its decimal representation, `schema` as a
/// serialized JSON value.
pub fn tool_meta_to_map(meta: &ToolMeta) -> Result<HashMap<String, String>, QueueError> {
    let mut map = HashMap::new();
    map.insert("name".to_string(), meta.name.clone());
    map.insert("version".to_string(), meta.version.clone());
    map.insert("description".to_string(), meta.description.clone());
    map.insert(
        "schema".to_string(),
        serde_json::to_string(&meta.schema).map_err(|e| QueueError::Encoding(e.to_string()))?,
    );
    map.insert(
        "tags".to_string(),
        serde_json::to_string(&meta.tags).map_err(|e| QueueError::Encoding(e.to_string()))?,
    );
    map.insert("input_type".to_string(), meta.input_type.clone());
    map.insert("output_type".to_string(), meta.output_type.clone());
    map.insert("worker_count".to_string(), meta.worker_count.to_string());
    Ok(map)
}

/// Reconstruct a `ToolMeta` from the flat map written by
/// [`tool_meta_to_map`]. Returns `None` (rather than an error) when the
/// map is missing required fields or contains undecodable values — per
/// spec §4.1.2, `ListTools` silently skips records like this.
pub fn tool_meta_from_map(map: &HashMap<String, String>) -> Option<ToolMeta> {
    let name = map.get("name")?.clone();
    let version = map.get("version")?.clone();
    let input_type = map.get("input_type")?.clone();
    let output_type = map.get("output_type")?.clone();
    let description = map.get("description").cloned().unwrap_or_default();
    let schema = map
        .get("schema")
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or(serde_json::Value::Null);
    let tags = map
        .get("tags")
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    let worker_count = map
        .get("worker_count")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    Some(ToolMeta {
        name,
        version,
        description,
        schema,
        tags,
        input_type,
        output_type,
        worker_count,
    })
}
