//! # fabric-config — effective worker options
//!
//! [`resolve`] merges an explicit [`WorkerOptionsInput`], a
//! [`ToolManifest`]'s `worker` section, and built-in defaults into one
//! [`WorkerOptions`] record, following the precedence in spec §4.3:
//! explicit value, then manifest, then default.
//!
//! Manifest *parsing* (loading TOML off disk) lives in [`manifest`];
//! precedence resolution itself is independent of how the manifest got
//! there — [`WorkerOptionsInput::manifest`] accepts an already-parsed
//! record just as well as [`WorkerOptionsInput::manifest_path`].

#![deny(missing_docs)]

pub mod error;
pub mod manifest;
pub mod options;

pub use error::ConfigError;
pub use manifest::{ToolManifest, WorkerManifestSection, DEFAULT_MANIFEST_FILENAME};
pub use options::{
    resolve, LoggerOptions, WorkerOptions, WorkerOptionsInput, DEFAULT_CONCURRENCY,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_TRANSPORT_URL,
};
