//! Error type for manifest loading.

use std::path::PathBuf;
use thiserror::Error;

/// Failures loading or parsing a `ToolManifest` from disk.
///
/// A best-effort lookup that fails to *find* a manifest is not an
/// error (see [`crate::resolve`]); this type only covers a manifest
/// that was found but could not be parsed, or an explicitly supplied
/// `manifest_path` that does not exist.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest at `path` could not be read or parsed as TOML.
    #[error("failed to load manifest from {path}: {source}")]
    ManifestLoad {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying figment error.
        #[source]
        source: figment::Error,
    },
}
