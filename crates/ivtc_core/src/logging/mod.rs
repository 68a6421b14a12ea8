//! Logging setup on top of the `tracing` ecosystem.
//!
//! Library code only emits `tracing` events. Binaries pick a subscriber:
//! - [`init_tracing`]: stderr only
//! - [`init_tracing_with_file`]: stderr plus `ivtc.log` in a folder
//!
//! Both honour `RUST_LOG` and fall back to the given level.

mod types;

pub use types::LogLevel;

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the log file written by [`init_tracing_with_file`].
pub const LOG_FILE_NAME: &str = "ivtc.log";

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

/// Initialize the global subscriber writing to stderr.
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(env_filter(default_level))
        .init();
}

/// Initialize the global subscriber writing to stderr and to
/// `<logs_dir>/ivtc.log`.
///
/// The file is written from a background thread; keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> io::Result<WorkerGuard> {
    fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(default_level))
        .init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
