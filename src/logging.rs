//! Structured logging: JSONL file plus human-readable stderr.
//!
//! The JSONL stream (`~/.clipstack/logs/clipstack.jsonl`) is append-only and
//! machine-parseable; stderr carries the compact human view. `RUST_LOG`
//! overrides the default `info` filter.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
pub fn init() -> LoggingGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[clipstack] failed to create log directory: {e}");
    }
    let log_path = log_dir.join("clipstack.jsonl");

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap_or_else(|e| {
            eprintln!("[clipstack] failed to open log file: {e}");
            OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .expect("Failed to open /dev/null")
        });

    // Non-blocking writer so capture threads never stall on log IO.
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(log_path = %log_path.display(), "Logging initialized");

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Log directory (`~/.clipstack/logs/`).
fn log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".clipstack").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("clipstack-logs"))
}
