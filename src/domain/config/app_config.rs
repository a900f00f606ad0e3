//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::{MaxRecordingHours, DEFAULT_DOWNLOAD_FILENAME};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub max_recording_hours: Option<u32>,
    pub download_filename: Option<String>,
    pub output_dir: Option<String>,
    pub playback: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            max_recording_hours: Some(MaxRecordingHours::default().get()),
            download_filename: Some(DEFAULT_DOWNLOAD_FILENAME.to_string()),
            output_dir: None,
            playback: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_recording_hours: other.max_recording_hours.or(self.max_recording_hours),
            download_filename: other.download_filename.or(self.download_filename),
            output_dir: other.output_dir.or(self.output_dir),
            playback: other.playback.or(self.playback),
        }
    }

    /// Get the maximum recording length, or default if not set/zero
    pub fn max_recording_hours_or_default(&self) -> MaxRecordingHours {
        self.max_recording_hours
            .filter(|hours| *hours > 0)
            .map(MaxRecordingHours::new)
            .unwrap_or_default()
    }

    /// Get the download filename, or "myfile.mp3" if not set/blank
    pub fn download_filename_or_default(&self) -> &str {
        self.download_filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_DOWNLOAD_FILENAME)
    }

    /// Get the download directory, or the current directory if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get playback setting, or true if not set
    pub fn playback_or_default(&self) -> bool {
        self.playback.unwrap_or(true)
    }
}
