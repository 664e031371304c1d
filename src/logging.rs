//! Tracing setup shared by the binaries.
//!
//! Stderr gets `warn` and above unless raised with `-v` or `RUST_LOG`. When a log directory is
//! given, everything vhostcrab logs at `info` and above is also appended to
//! `<log_dir>/manager.log`.

use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub const LOG_FILE: &str = "manager.log";

/// Install the global subscriber. The returned guard must be held until exit so buffered file
/// output is flushed.
pub fn init(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard, file_err) = match log_dir.map(file_writer) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("vhostcrab=info"));
            (Some(layer), Some(guard), None)
        }
        Some(Err(err)) => (None, None, Some(err)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let (Some(err), Some(dir)) = (file_err, log_dir) {
        tracing::warn!("not logging to {}: {err}", dir.join(LOG_FILE).display());
    }
    guard
}

fn file_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    // The appender panics on open failure, so find out first.
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    Ok(tracing_appender::non_blocking(
        tracing_appender::rolling::never(dir, LOG_FILE),
    ))
}
