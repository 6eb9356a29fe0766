//! Startup-fatal errors (spec §4.2.1, §7).
//!
//! Only the startup sequence's connect and register steps produce a
//! fatal error; every other failure mode (pop, publish, heartbeat,
//! decode, handler) is contained and surfaces as a [`fabric_types::JobResult`]
//! or a logged, swallowed transient error instead.

use fabric_config::ConfigError;
use fabric_queue::QueueError;
use thiserror::Error;

/// Failures that abort [`crate::runtime::WorkerRuntime::run`] before it
/// reaches steady state.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Resolving effective options (spec §4.2.1 step 1) failed.
    #[error("failed to resolve worker configuration: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to the transport (spec §4.2.1 step 3) failed.
    #[error("failed to connect to transport: {0}")]
    Connect(#[source] QueueError),

    /// Registering the tool (spec §4.2.1 step 4) failed.
    #[error("failed to register tool: {0}")]
    Register(#[source] QueueError),
}
