//! Error taxonomy for the queue client (spec §4.1.2, §7).

use fabric_types::ValidationError;
use thiserror::Error;

/// Every `QueueClient` operation resolves to one of these, or success.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum QueueError {
    /// Connection or timeout failure in the underlying transport.
    /// Callers decide whether to retry.
    #[error("transport error: {0}")]
    Transport(String),

    /// A payload failed to encode or decode locally. Fatal for that call.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The caller's operating context ended before the operation completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A `WorkItem`/`JobResult`/`ToolMeta` failed its validity check
    /// before any transport call was made.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::Transport(err.to_string())
    }
}
