//! # fabric-worker — the per-tool worker runtime
//!
//! [`WorkerRuntime`] runs a [`ToolHandler`] as a long-lived process: it
//! mints a worker id, connects to the transport, registers the tool,
//! starts a heartbeat task and a fixed-size consumer pool, and drains
//! cooperatively on shutdown. [`process::process_work_item`] is the
//! per-item decode/dispatch/encode algorithm each consumer runs.

#![deny(missing_docs)]

pub mod consumer;
pub mod error;
pub mod handler;
pub mod heartbeat;
pub mod process;
pub mod registry;
pub mod runtime;
pub mod worker_id;

pub use error::WorkerError;
pub use handler::ToolHandler;
pub use process::process_work_item;
pub use registry::{JsonTypeRegistry, TypeRegistry};
pub use runtime::{exit_code, WorkerRuntime};
