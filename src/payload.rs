//! Clip payload model
//!
//! Classifies captured clipboard content by format and holds the normalized
//! payload. Equality is content-deep and never looks at the capture
//! timestamp, which makes it usable directly for history deduplication.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::UnsupportedFormat;

/// Clipboard formats the engine understands, in classification priority
/// order: text wins over an image, an image wins over a file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipFormat {
    Text,
    Image,
    FileList,
}

impl ClipFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipFormat::Text => "text",
            ClipFormat::Image => "image",
            ClipFormat::FileList => "file-list",
        }
    }
}

impl std::fmt::Display for ClipFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded bitmap captured from the clipboard.
///
/// Pixel data is RGBA behind an `Arc` so entries and history snapshots clone
/// cheaply. A SHA-256 content hash is computed once at construction and used
/// as the fast path for equality checks during dedup scans.
#[derive(Debug, Clone)]
pub struct BitmapData {
    pub width: usize,
    pub height: usize,
    bytes: Arc<[u8]>,
    content_hash: [u8; 32],
}

impl BitmapData {
    pub fn new(width: usize, height: usize, bytes: Vec<u8>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let content_hash = hasher.finalize().into();

        Self {
            width,
            height,
            bytes: bytes.into(),
            content_hash,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for BitmapData {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.content_hash == other.content_hash
            && self.bytes == other.bytes
    }
}

impl Eq for BitmapData {}

/// Normalized clipboard content, one variant per [`ClipFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipContent {
    Text(String),
    Image(BitmapData),
    FileList(Vec<String>),
}

impl ClipContent {
    pub fn format(&self) -> ClipFormat {
        match self {
            ClipContent::Text(_) => ClipFormat::Text,
            ClipContent::Image(_) => ClipFormat::Image,
            ClipContent::FileList(_) => ClipFormat::FileList,
        }
    }
}

/// A snapshot of what the OS clipboard currently offers.
///
/// The bridge fills in whichever representations are available; more than
/// one may be present at once. Classification picks exactly one.
#[derive(Debug, Clone, Default)]
pub struct RawClip {
    pub text: Option<String>,
    pub image: Option<BitmapData>,
    pub files: Option<Vec<String>>,
}

impl RawClip {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none() && self.files.is_none()
    }
}

/// One captured clip: classified content plus the capture timestamp.
#[derive(Debug, Clone)]
pub struct ClipPayload {
    content: ClipContent,
    captured_at: DateTime<Utc>,
}

impl ClipPayload {
    pub fn new(content: ClipContent) -> Self {
        Self::with_captured_at(content, Utc::now())
    }

    pub fn with_captured_at(content: ClipContent, captured_at: DateTime<Utc>) -> Self {
        let content = match content {
            ClipContent::FileList(paths) => ClipContent::FileList(normalize_file_list(paths)),
            other => other,
        };
        Self {
            content,
            captured_at,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ClipContent::Text(text.into()))
    }

    pub fn image(bitmap: BitmapData) -> Self {
        Self::new(ClipContent::Image(bitmap))
    }

    pub fn file_list(paths: Vec<String>) -> Self {
        Self::new(ClipContent::FileList(paths))
    }

    /// Classify a raw clipboard snapshot by trying formats in fixed priority
    /// order: text, then image, then file list. The first available format
    /// wins; a payload is never multi-format.
    pub fn classify(raw: &RawClip) -> Result<Self, UnsupportedFormat> {
        if let Some(text) = &raw.text {
            return Ok(Self::text(text.clone()));
        }
        if let Some(image) = &raw.image {
            return Ok(Self::image(image.clone()));
        }
        if let Some(files) = &raw.files {
            return Ok(Self::file_list(files.clone()));
        }
        Err(UnsupportedFormat)
    }

    pub fn format(&self) -> ClipFormat {
        self.content.format()
    }

    pub fn content(&self) -> &ClipContent {
        &self.content
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Age of this payload relative to `now`, in whole minutes.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.captured_at).num_minutes()
    }
}

/// Payload equality is format + deep content equality; `captured_at` never
/// participates.
impl PartialEq for ClipPayload {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for ClipPayload {}

/// Strip trailing line endings from each path so that capture-time display
/// framing ("path\r\n") never leaks into equality checks.
fn normalize_file_list(paths: Vec<String>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.trim_end_matches(['\r', '\n']).to_string())
        .collect()
}
