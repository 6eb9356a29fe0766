//! [`JobResult`] — the outcome of processing one [`crate::WorkItem`].

use crate::error::ValidationError;
use crate::id::{JobId, WorkerId};
use serde::{Deserialize, Serialize};

/// The outcome of one `ProcessWorkItem` invocation: exactly one of
/// success (`output_bytes` non-empty) or failure (`error` non-empty).
///
/// Like [`crate::WorkItem`], this is a transit value — created once by
/// the consumer that ran the handler, never mutated afterward.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobResult {
    /// Correlation identifier, copied from the originating `WorkItem`.
    pub job_id: JobId,
    /// Position within the batch, copied from the originating `WorkItem`.
    pub index: i64,
    /// The output type label, copied from the originating `WorkItem`.
    pub output_type: String,
    /// The worker process that produced this result.
    pub worker_id: WorkerId,
    /// Millisecond epoch when processing started. Strictly positive.
    pub started_at: i64,
    /// Millisecond epoch when processing completed. `>= started_at`.
    pub completed_at: i64,
    /// Handler output. Non-empty on success, empty on failure.
    #[serde(default)]
    pub output_bytes: Vec<u8>,
    /// Error message. Empty on success, non-empty on failure.
    #[serde(default)]
    pub error: String,
}

impl JobResult {
    /// Build a successful result.
    pub fn success(
        job_id: impl Into<JobId>,
        index: i64,
        output_type: impl Into<String>,
        worker_id: impl Into<WorkerId>,
        started_at: i64,
        completed_at: i64,
        output_bytes: Vec<u8>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            index,
            output_type: output_type.into(),
            worker_id: worker_id.into(),
            started_at,
            completed_at,
            output_bytes,
            error: String::new(),
        }
    }

    /// Build a failure result.
    pub fn failure(
        job_id: impl Into<JobId>,
        index: i64,
        output_type: impl Into<String>,
        worker_id: impl Into<WorkerId>,
        started_at: i64,
        completed_at: i64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            index,
            output_type: output_type.into(),
            worker_id: worker_id.into(),
            started_at,
            completed_at,
            output_bytes: Vec::new(),
            error: error.into(),
        }
    }

    /// Whether this result represents a successful execution.
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Check every invariant from spec §3/§8.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.job_id.is_empty() {
            return Err(ValidationError::empty("job_id"));
        }
        if self.index < 0 {
            return Err(ValidationError::invalid("index", "must be >= 0"));
        }
        if self.output_type.is_empty() {
            return Err(ValidationError::empty("output_type"));
        }
        if self.worker_id.is_empty() {
            return Err(ValidationError::empty("worker_id"));
        }
        if self.started_at <= 0 {
            return Err(ValidationError::invalid("started_at", "must be > 0"));
        }
        if self.completed_at <= 0 {
            return Err(ValidationError::invalid("completed_at", "must be > 0"));
        }
        if self.completed_at < self.started_at {
            return Err(ValidationError::invalid(
                "completed_at",
                "must be >= started_at",
            ));
        }
        if self.output_bytes.is_empty() && self.error.is_empty() {
            return Err(ValidationError::invalid(
                "output_bytes",
                "must be non-empty when error is empty",
            ));
        }
        Ok(())
    }

    /// Whether this result satisfies every invariant in [`Self::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
