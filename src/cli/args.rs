//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use crate::domain::recording::MaxRecordingHours;

/// ClipRecorder - record, play back and save audio clips
#[derive(Parser, Debug)]
#[command(name = "clip-recorder")]
#[command(version)]
#[command(about = "Record audio clips from the default microphone, play them back and save them")]
#[command(long_about = None)]
pub struct Cli {
    /// Stop a recording automatically after this many hours (e.g., 1, 2h)
    #[arg(short = 'm', long, value_name = "HOURS")]
    pub max_hours: Option<String>,

    /// Directory downloads are saved into
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Suggested filename for downloads
    #[arg(short = 'f', long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Do not play recordings back after stopping
    #[arg(long)]
    pub no_playback: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log threshold for stderr. Routine progress belongs to the presenter.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed options for an interactive recorder session
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    pub max_recording_hours: MaxRecordingHours,
    pub download_filename: String,
    pub output_dir: PathBuf,
    pub playback: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "max_recording_hours",
    "download_filename",
    "output_dir",
    "playback",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
