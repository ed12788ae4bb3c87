//! clipstack - a desktop clipboard-history engine
//!
//! Observes system clipboard changes, keeps a bounded ordered history of
//! captured clips with pinning and drag-reorder semantics, and re-applies
//! clips to the clipboard with feedback-loop suppression. Rendering and OS
//! viewer-chain plumbing live outside this crate; the engine consumes
//! classified captures and a settings snapshot, and emits history/selection
//! notifications.

pub mod bridge;
pub mod error;
pub mod history;
pub mod logging;
pub mod monitor;
pub mod payload;
pub mod settings;

pub use bridge::{ClipboardBridge, SystemClipboard};
pub use error::{ApplyError, HistoryError, ReadFailure, UnsupportedFormat, WriteFailure};
pub use history::{ClipEntry, ClipHistory, HistoryEvent};
pub use payload::{BitmapData, ClipContent, ClipFormat, ClipPayload, RawClip};
pub use settings::Settings;
