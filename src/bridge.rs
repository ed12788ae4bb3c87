//! System clipboard bridge
//!
//! Bridges raw OS clipboard state into [`RawClip`] snapshots and writes
//! payloads back out. The engine only ever talks to the [`ClipboardBridge`]
//! trait; the arboard-backed [`SystemClipboard`] is the production
//! implementation, and tests substitute an in-memory double.

use arboard::Clipboard;
use tracing::debug;

use crate::error::{ReadFailure, WriteFailure};
use crate::payload::{BitmapData, ClipContent, ClipPayload, RawClip};

/// Adapter between the engine and one system clipboard.
///
/// Implementations must deliver reads in real arrival order, one at a time;
/// format-specific encoding on write is entirely the bridge's concern.
/// Platform clipboards are generally thread-affine, so the monitor
/// constructs its bridge inside the thread that polls it.
pub trait ClipboardBridge {
    /// Snapshot whatever the clipboard currently offers.
    fn read(&mut self) -> Result<RawClip, ReadFailure>;

    /// Push a payload onto the system clipboard.
    fn write(&mut self, payload: &ClipPayload) -> Result<(), WriteFailure>;
}

/// arboard-backed bridge for the real system clipboard.
///
/// arboard transports text and bitmaps; there is no portable file-list
/// transport, so `read` never reports files and writing a file-list payload
/// fails with [`WriteFailure::UnsupportedByPlatform`].
pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ReadFailure> {
        let clipboard = Clipboard::new().map_err(|e| ReadFailure(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardBridge for SystemClipboard {
    fn read(&mut self) -> Result<RawClip, ReadFailure> {
        let mut raw = RawClip::default();

        match self.clipboard.get_text() {
            Ok(text) if !text.is_empty() => raw.text = Some(text),
            _ => {}
        }

        // Only decode the bitmap when no text is offered; classification
        // would discard it anyway.
        if raw.text.is_none() {
            if let Ok(image) = self.clipboard.get_image() {
                debug!(
                    width = image.width,
                    height = image.height,
                    "Read bitmap from system clipboard"
                );
                raw.image = Some(BitmapData::new(
                    image.width,
                    image.height,
                    image.bytes.into_owned(),
                ));
            }
        }

        Ok(raw)
    }

    fn write(&mut self, payload: &ClipPayload) -> Result<(), WriteFailure> {
        match payload.content() {
            ClipContent::Text(text) => self
                .clipboard
                .set_text(text)
                .map_err(|e| WriteFailure::Backend(e.to_string())),
            ClipContent::Image(bitmap) => {
                let image = arboard::ImageData {
                    width: bitmap.width,
                    height: bitmap.height,
                    bytes: bitmap.bytes().to_vec().into(),
                };
                self.clipboard
                    .set_image(image)
                    .map_err(|e| WriteFailure::Backend(e.to_string()))
            }
            ClipContent::FileList(_) => Err(WriteFailure::UnsupportedByPlatform {
                format: payload.format(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal bridge double mirroring a clipboard that only holds the last
    /// written payload.
    #[derive(Default)]
    struct MemoryClipboard {
        current: Option<ClipPayload>,
    }

    impl ClipboardBridge for MemoryClipboard {
        fn read(&mut self) -> Result<RawClip, ReadFailure> {
            let mut raw = RawClip::default();
            match self.current.as_ref().map(ClipPayload::content) {
                Some(ClipContent::Text(t)) => raw.text = Some(t.clone()),
                Some(ClipContent::Image(b)) => raw.image = Some(b.clone()),
                Some(ClipContent::FileList(f)) => raw.files = Some(f.clone()),
                None => {}
            }
            Ok(raw)
        }

        fn write(&mut self, payload: &ClipPayload) -> Result<(), WriteFailure> {
            self.current = Some(payload.clone());
            Ok(())
        }
    }

    #[test]
    fn test_write_then_read_round_trips_through_classification() {
        let mut bridge = MemoryClipboard::default();
        bridge.write(&ClipPayload::text("hello")).unwrap();

        let raw = bridge.read().unwrap();
        let classified = ClipPayload::classify(&raw).unwrap();
        assert_eq!(classified, ClipPayload::text("hello"));
    }

    #[test]
    fn test_empty_clipboard_reads_empty_snapshot() {
        let mut bridge = MemoryClipboard::default();
        let raw = bridge.read().unwrap();
        assert!(raw.is_empty());
        assert!(ClipPayload::classify(&raw).is_err());
    }
}
