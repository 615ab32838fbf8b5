//! Tracing subscriber setup.
//!
//! Console output is always on. Optional file sinks receive application
//! events and HTTP access lines respectively, each through its own
//! non-blocking writer thread.

use std::path::Path;

use anyhow::Context;
use rolodex_config::{LogConfig, Profile};
use tracing::Level;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::{Targets, filter_fn},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Target of the per-request lines written by the HTTP trace layer.
pub const ACCESS_TARGET: &str = "rolodex::access";

/// Keeps the file sink writer threads alive. Buffered lines are flushed
/// when this is dropped, so hold it until the process exits.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops the log file writers"]
pub struct TelemetryGuard {
    _workers: Vec<WorkerGuard>,
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(profile: Profile) -> String {
    format!(
        "{},tower_http=warn,{}=info",
        profile.default_log_filter(),
        ACCESS_TARGET
    )
}

pub fn init_tracing(
    profile: Profile,
    log: &LogConfig,
) -> anyhow::Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(profile)));
    let mut workers = Vec::new();

    let application = match log.application.as_deref() {
        Some(path) => {
            let (writer, guard) = file_sink(path)?;
            workers.push(guard);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter_fn(|meta| {
                        meta.target() != ACCESS_TARGET
                    })),
            )
        }
        None => None,
    };

    let access = match log.access.as_deref() {
        Some(path) => {
            let (writer, guard) = file_sink(path)?;
            workers.push(guard);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(writer)
                    .with_filter(
                        Targets::new().with_target(ACCESS_TARGET, Level::INFO),
                    ),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(application)
        .with(access)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(TelemetryGuard { _workers: workers })
}

/// Appends to `path` without rotation, off the request path.
fn file_sink(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}
