//! [`ToolHandler`] — the external, user-supplied collaborator the
//! runtime invokes for each work item (spec §2, "Tool handler (external)").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A named, versioned handler exposed by an executable that takes one
/// decoded input value and returns one decoded output value, or an
/// error message.
///
/// The runtime never inspects the concrete shape of the input/output
/// values it decodes on the handler's behalf — see [`crate::registry::TypeRegistry`].
/// Implementations should observe `cancel` where practical, but the
/// runtime does not force-kill a handler that ignores it (spec §5).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The tool's name — becomes `ToolMeta::name` at registration.
    fn name(&self) -> &str;
    /// The tool's version — becomes `ToolMeta::version`.
    fn version(&self) -> &str;
    /// Human-readable description — becomes `ToolMeta::description`.
    fn description(&self) -> &str;
    /// Free-form discovery tags — become `ToolMeta::tags`.
    fn tags(&self) -> &[String];
    /// The fully-qualified input type this handler decodes.
    fn input_type(&self) -> &str;
    /// The fully-qualified output type this handler produces.
    fn output_type(&self) -> &str;

    /// Execute the handler against a decoded input value, producing a
    /// decoded output value. An `Err` becomes the `error` field of a
    /// failure [`fabric_types::JobResult`] verbatim (spec §4.2.4 step 4).
    async fn execute_binary(
        &self,
        cancel: &CancellationToken,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, String>;
}
