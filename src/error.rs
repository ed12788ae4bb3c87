//! Domain errors and logging helpers.

use thiserror::Error;
use tracing::{error, warn};

use crate::payload::ClipFormat;

/// Classification failure: nothing the clipboard currently offers maps to a
/// format the engine understands. Non-fatal; the capture is silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no supported clipboard format available")]
pub struct UnsupportedFormat;

/// Failure to push a payload onto the system clipboard.
///
/// Surfaced to the caller of `apply`; never retried automatically.
#[derive(Debug, Error)]
pub enum WriteFailure {
    /// The OS clipboard rejected the write (e.g. locked by another process).
    #[error("clipboard write failed: {0}")]
    Backend(String),

    /// The platform adapter has no transport for this format.
    #[error("{format} payloads are not supported by this platform adapter")]
    UnsupportedByPlatform { format: ClipFormat },
}

/// Failure to read the current clipboard contents.
#[derive(Debug, Error)]
#[error("clipboard read failed: {0}")]
pub struct ReadFailure(pub String);

/// History operations addressing a specific entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("entry not found: {id}")]
    EntryNotFound { id: String },
}

/// Failure while applying an entry back to the system clipboard.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Write(#[from] WriteFailure),
}

/// Extension trait for ergonomic error logging at call sites where the
/// operation is recoverable and the result is not worth propagating.
pub trait ResultLogExt<T> {
    fn log_err(self) -> Option<T>;
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultLogExt<T> for Result<T, E> {
    fn log_err(self) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                error!(error = ?e, "Operation failed");
                None
            }
        }
    }

    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = ?e, "Operation warning");
                None
            }
        }
    }
}
