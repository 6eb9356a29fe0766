//! [`ToolMeta`] — the directory record a worker publishes at startup.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// The directory record a worker registers for its tool at startup.
///
/// Unlike [`crate::WorkItem`] and [`crate::JobResult`], `ToolMeta` is not
/// a transit value — it is overwritten in place on every re-registration
/// (§3). `worker_count` is a transient snapshot taken at registration
/// time; the authoritative live count lives in its own counter (spec §4.1).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolMeta {
    /// Tool name. Required.
    pub name: String,
    /// Tool version. Required.
    pub version: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON Schema (or equivalent) for the handler's input.
    #[serde(default)]
    pub schema: serde_json::Value,
    /// Free-form tags for discovery/filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The handler's advertised input type binding.
    pub input_type: String,
    /// The handler's advertised output type binding.
    pub output_type: String,
    /// Snapshot of the live-worker count at the moment of registration.
    #[serde(default)]
    pub worker_count: i64,
}

impl ToolMeta {
    /// Construct a `ToolMeta` with the required fields and empty
    /// optional fields.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            schema: serde_json::Value::Null,
            tags: Vec::new(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            worker_count: 0,
        }
    }

    /// Check the required-field invariants from spec §3.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::empty("name"));
        }
        if self.version.is_empty() {
            return Err(ValidationError::empty("version"));
        }
        if self.input_type.is_empty() {
            return Err(ValidationError::empty("input_type"));
        }
        if self.output_type.is_empty() {
            return Err(ValidationError::empty("output_type"));
        }
        Ok(())
    }

    /// Whether this record satisfies every invariant in [`Self::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
