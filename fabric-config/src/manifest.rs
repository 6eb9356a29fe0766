//! `ToolManifest` — the on-disk record a worker may read its
//! `worker` section from (spec §4.3).

use crate::error::ConfigError;
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filename tried during the best-effort manifest lookup when neither
/// `manifest` nor `manifest_path` was supplied explicitly.
pub const DEFAULT_MANIFEST_FILENAME: &str = "fabric.toml";

/// A pre-parsed or disk-loaded tool manifest. Only the `worker` section
/// has defined effects in the core worker configuration; the rest of
/// the file (handler-specific sections) is out of scope and not
/// represented here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolManifest {
    /// Worker-tuning fields. Missing fields fall through to the next
    /// precedence tier.
    #[serde(default)]
    pub worker: WorkerManifestSection,
}

/// The `[worker]` section of a `ToolManifest`. Every field is optional:
/// an absent field means "not set at this tier", not "set to zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerManifestSection {
    /// Overrides the consumer pool size.
    pub concurrency: Option<u32>,
    /// Overrides the shutdown drain deadline, in seconds.
    pub shutdown_timeout_secs: Option<u64>,
    /// Recognized but without a defined effect in the core contract
    /// (spec §9 open question — the worker hard-codes the `tool:` prefix).
    pub queue_prefix: Option<String>,
    /// Recognized but without a defined effect in the core contract.
    pub heartbeat_interval_secs: Option<u64>,
    /// Recognized but unimplemented — no retry semantics exist in the
    /// core contract (spec §9 open question).
    pub max_retries: Option<u32>,
}

impl ToolManifest {
    /// Parse a manifest from a TOML file at `path`. Any failure to
    /// read or parse is reported as [`ConfigError::ManifestLoad`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|source| ConfigError::ManifestLoad {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Try `DEFAULT_MANIFEST_FILENAME` in `dir`. Returns `None` rather
    /// than an error on any failure — per spec §4.3, a best-effort
    /// lookup failure is not an error; defaults apply.
    pub fn best_effort_lookup(dir: impl AsRef<Path>) -> Option<Self> {
        let candidate: PathBuf = dir.as_ref().join(DEFAULT_MANIFEST_FILENAME);
        if !candidate.is_file() {
            return None;
        }
        Self::load_from_path(&candidate).ok()
    }
}
