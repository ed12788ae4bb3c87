//! Engine settings snapshot.
//!
//! The history engine consumes a read-only [`Settings`] value per call and
//! never persists anything itself; the binary loads the file at startup and
//! writes it back when the user changes something.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::payload::ClipFormat;

/// Default cap on the number of history entries (0 disables the cap).
pub const DEFAULT_ITEM_NUMBER_LIMIT: usize = 25;

/// Default age limit in minutes (0 disables age-based eviction).
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum number of entries kept on the board; 0 means unbounded.
    #[serde(default = "default_item_number_limit", rename = "itemNumberLimit")]
    pub item_number_limit: usize,

    /// Entries older than this many minutes are swept; 0 disables the sweep.
    #[serde(default, rename = "timeLimitMinutes")]
    pub time_limit_minutes: u32,

    #[serde(default = "default_true", rename = "textEnabled")]
    pub text_enabled: bool,

    #[serde(default = "default_true", rename = "imageEnabled")]
    pub image_enabled: bool,

    #[serde(default, rename = "fileListEnabled")]
    pub file_list_enabled: bool,
}

fn default_item_number_limit() -> usize {
    DEFAULT_ITEM_NUMBER_LIMIT
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            item_number_limit: DEFAULT_ITEM_NUMBER_LIMIT,
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            text_enabled: true,
            image_enabled: true,
            file_list_enabled: false,
        }
    }
}

impl Settings {
    /// Whether captures of the given format are accepted into the history.
    pub fn is_format_enabled(&self, format: ClipFormat) -> bool {
        match format {
            ClipFormat::Text => self.text_enabled,
            ClipFormat::Image => self.image_enabled,
            ClipFormat::FileList => self.file_list_enabled,
        }
    }

    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "Loaded settings");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed settings file, using defaults");
                    Settings::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "No settings file, using defaults");
                Settings::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Default on-disk location (`~/.clipstack/settings.json`).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".clipstack").join("settings.json"))
            .unwrap_or_else(|| std::env::temp_dir().join("clipstack-settings.json"))
    }
}
