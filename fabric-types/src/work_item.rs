//! [`WorkItem`] — a batch-aware unit of work pushed onto a tool's queue.

use crate::error::ValidationError;
use crate::id::{JobId, ToolName};
use serde::{Deserialize, Serialize};

/// A unit of work submitted to a tool's queue.
///
/// `WorkItem` is a transit value: created by the submitter, destroyed by
/// the consumer that successfully pops and processes it. It is never
/// mutated in place — a retry (were one ever added) would construct a new
/// `WorkItem`, not reuse this one.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItem {
    /// Correlation identifier shared by all items of one logical job.
    pub job_id: JobId,
    /// Position of this item within its batch. `0 <= index < total`.
    pub index: i64,
    /// Batch cardinality. `total >= 1`.
    pub total: i64,
    /// The logical tool name (routing key).
    pub tool: ToolName,
    /// Opaque payload for the handler.
    pub input_bytes: Vec<u8>,
    /// Fully-qualified type name the handler uses to decode `input_bytes`.
    pub input_type: String,
    /// Fully-qualified type name the handler uses to label its output.
    pub output_type: String,
    /// Optional distributed-trace correlator.
    #[serde(default)]
    pub trace_id: String,
    /// Optional distributed-trace correlator.
    #[serde(default)]
    pub span_id: String,
    /// Millisecond epoch. Strictly positive.
    pub submitted_at: i64,
}

impl WorkItem {
    /// Construct a `WorkItem` with the required fields, leaving the
    /// optional trace correlators empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: impl Into<JobId>,
        index: i64,
        total: i64,
        tool: impl Into<ToolName>,
        input_bytes: Vec<u8>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        submitted_at: i64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            index,
            total,
            tool: tool.into(),
            input_bytes,
            input_type: input_type.into(),
            output_type: output_type.into(),
            trace_id: String::new(),
            span_id: String::new(),
            submitted_at,
        }
    }

    /// Check every invariant from spec §3/§8. Called by the queue client
    /// before `Push`; a failing value is never placed on the wire.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.job_id.is_empty() {
            return Err(ValidationError::empty("job_id"));
        }
        if self.index < 0 {
            return Err(ValidationError::invalid("index", "must be >= 0"));
        }
        if self.total <= 0 {
            return Err(ValidationError::invalid("total", "must be >= 1"));
        }
        if self.index >= self.total {
            return Err(ValidationError::invalid("index", "must be < total"));
        }
        if self.tool.is_empty() {
            return Err(ValidationError::empty("tool"));
        }
        if self.input_bytes.is_empty() {
            return Err(ValidationError::empty("input_bytes"));
        }
        if self.input_type.is_empty() {
            return Err(ValidationError::empty("input_type"));
        }
        if self.output_type.is_empty() {
            return Err(ValidationError::empty("output_type"));
        }
        if self.submitted_at <= 0 {
            return Err(ValidationError::invalid("submitted_at", "must be > 0"));
        }
        Ok(())
    }

    /// Whether this item satisfies every invariant in [`Self::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_item() -> WorkItem {
        WorkItem::new(
            "j1",
            0,
            1,
            "t",
            b"hello".to_vec(),
            "T.In",
            "T.Out",
            1000,
        )
    }

    #[test]
    fn valid_item_passes() {
        assert!(valid_item().is_valid());
    }

    #[test]
    fn rejects_empty_job_id() {
        let mut item = valid_item();
        item.job_id = "".into();
        assert_eq!(item.validate(), Err(ValidationError::empty("job_id")));
    }

    #[test]
    fn rejects_negative_index() {
        let mut item = valid_item();
        item.index = -1;
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_zero_total() {
        let mut item = valid_item();
        item.total = 0;
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_index_at_or_past_total() {
        let mut item = valid_item();
        item.index = 1;
        item.total = 1;
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_empty_tool() {
        let mut item = valid_item();
        item.tool = "".into();
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_empty_input_bytes() {
        let mut item = valid_item();
        item.input_bytes = vec![];
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_empty_input_type() {
        let mut item = valid_item();
        item.input_type = "".into();
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_empty_output_type() {
        let mut item = valid_item();
        item.output_type = "".into();
        assert!(item.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_submitted_at() {
        let mut item = valid_item();
        item.submitted_at = 0;
        assert!(item.validate().is_err());
    }

    #[test]
    fn roundtrips_through_json() {
        let item = valid_item();
        let json = serde_json::to_string(&item).unwrap();
        let back: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
