//! Effective worker options and the three-tier precedence merge
//! (spec §4.3).

use crate::error::ConfigError;
use crate::manifest::ToolManifest;
use std::path::PathBuf;
use std::time::Duration;

/// Default transport endpoint when neither explicit options nor a
/// manifest supply one.
pub const DEFAULT_TRANSPORT_URL: &str = "redis://localhost:6379";
/// Default consumer pool size.
pub const DEFAULT_CONCURRENCY: u32 = 4;
/// Default drain deadline on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum level the default logger emits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerOptions {
    /// The `tracing` level below which events are suppressed.
    pub level: tracing::Level,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
        }
    }
}

/// The subset of [`WorkerOptions`] a caller may set explicitly. Every
/// field is optional; `None` means "fall through to the manifest or
/// the built-in default" rather than "set to zero".
#[derive(Debug, Clone, Default)]
pub struct WorkerOptionsInput {
    /// Explicit transport endpoint.
    pub transport_url: Option<String>,
    /// Explicit consumer pool size.
    pub concurrency: Option<u32>,
    /// Explicit drain deadline.
    pub shutdown_timeout: Option<Duration>,
    /// Explicit logger configuration.
    pub logger: Option<LoggerOptions>,
    /// A pre-parsed manifest, taking precedence over `manifest_path`.
    pub manifest: Option<ToolManifest>,
    /// A path to load the manifest from when `manifest` is absent.
    pub manifest_path: Option<PathBuf>,
}

/// The effective configuration a worker process runs with, after
/// merging [`WorkerOptionsInput`], the resolved [`ToolManifest`] (if
/// any), and the built-in defaults.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Transport endpoint to connect to (spec §4.2.1 step 3).
    pub transport_url: String,
    /// Consumer pool size (spec §4.2.1 step 7).
    pub concurrency: u32,
    /// Drain deadline on shutdown (spec §4.2.5 step 3).
    pub shutdown_timeout: Duration,
    /// Logger configuration.
    pub logger: LoggerOptions,
    /// The manifest this configuration was resolved against, if any —
    /// kept for introspection; `queue_prefix`, `heartbeat_interval_secs`,
    /// and `max_retries` are recognized but have no defined effect on
    /// the worker (spec §9 open questions).
    pub manifest: Option<ToolManifest>,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            transport_url: DEFAULT_TRANSPORT_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            logger: LoggerOptions::default(),
            manifest: None,
        }
    }
}

/// Resolve effective [`WorkerOptions`] from `input`, following the
/// three-tier precedence in spec §4.3: explicit value, then the
/// manifest's `worker` section, then the built-in default.
///
/// `transport_url` and `logger` are not recognized manifest keys — only
/// the explicit value or the default applies to them.
pub fn resolve(input: WorkerOptionsInput) -> Result<WorkerOptions, ConfigError> {
    let manifest = resolve_manifest(&input)?;
    let worker_section = manifest.as_ref().map(|m| &m.worker);

    let concurrency = input
        .concurrency
        .or_else(|| worker_section.and_then(|w| w.concurrency))
        .unwrap_or(DEFAULT_CONCURRENCY);

    let shutdown_timeout = input
        .shutdown_timeout
        .or_else(|| {
            worker_section
                .and_then(|w| w.shutdown_timeout_secs)
                .map(Duration::from_secs)
        })
        .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);

    Ok(WorkerOptions {
        transport_url: input
            .transport_url
            .unwrap_or_else(|| DEFAULT_TRANSPORT_URL.to_string()),
        concurrency,
        shutdown_timeout,
        logger: input.logger.unwrap_or_default(),
        manifest,
    })
}

fn resolve_manifest(input: &WorkerOptionsInput) -> Result<Option<ToolManifest>, ConfigError> {
    if let Some(manifest) = &input.manifest {
        return Ok(Some(manifest.clone()));
    }
    if let Some(path) = &input.manifest_path {
        return ToolManifest::load_from_path(path).map(Some);
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    Ok(ToolManifest::best_effort_lookup(cwd))
}
