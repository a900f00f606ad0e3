//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ControllerView;
use crate::domain::controller::RecordingState;
use crate::domain::recording::{ElapsedTime, MaxRecordingHours};

use super::input::UserAction;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    last_view: Option<ControllerView>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            last_view: None,
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the interactive command list
    pub fn help(&self) {
        eprintln!("{}", "Commands:".bold());
        for (_, spellings, description) in UserAction::ALL {
            eprintln!("  {} {}", format!("{:<14}", spellings).cyan(), description);
        }
    }

    /// Format the live recording readout
    pub fn format_recording_status(&self, elapsed: ElapsedTime, max: MaxRecordingHours) -> String {
        format!("{} {} (stops at {})", "REC".red().bold(), elapsed, max)
    }

    /// Render a controller snapshot, printing only what changed
    pub fn render(&mut self, view: &ControllerView, max: MaxRecordingHours) {
        let previous = self.last_view.take();

        if view.state == RecordingState::Recording {
            if self.spinner.is_none() {
                self.start_spinner("");
            }
            self.update_spinner(&self.format_recording_status(view.elapsed, max));
        } else {
            self.stop_spinner();
        }

        for notice in notices(previous.as_ref(), view) {
            match notice {
                Notice::Info(message) => self.info(message),
                Notice::Warn(message) => self.warn(message),
            }
        }

        self.last_view = Some(view.clone());
    }
}

/// One-off line printed when a view changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Info(&'static str),
    Warn(&'static str),
}

const PLAYING_NOTICE: Notice = Notice::Info("Playing back recording...");
const PLAYBACK_DONE_NOTICE: Notice = Notice::Info("Playback finished");
const DISCARDED_NOTICE: Notice = Notice::Info("Recording discarded");
const DOWNLOAD_NOTICE: Notice = Notice::Info("Recording ready. Type 'd' to download it");
const UNSUPPORTED_NOTICE: Notice =
    Notice::Warn("Audio capture is not supported on this system. Type 'ok' to dismiss");

/// Notices for the step from `previous` to `view`
fn notices(previous: Option<&ControllerView>, view: &ControllerView) -> Vec<Notice> {
    let mut out = Vec::new();

    match (previous.map(|v| v.state), view.state) {
        (Some(RecordingState::Recording), RecordingState::Playing) => out.push(PLAYING_NOTICE),
        (Some(RecordingState::Playing), RecordingState::Idle) => out.push(PLAYBACK_DONE_NOTICE),
        (Some(RecordingState::Recording), RecordingState::Idle) => out.push(DISCARDED_NOTICE),
        _ => {}
    }

    if view.download_available && !previous.is_some_and(|v| v.download_available) {
        out.push(DOWNLOAD_NOTICE);
    }
    if view.unsupported_overlay && !previous.is_some_and(|v| v.unsupported_overlay) {
        out.push(UNSUPPORTED_NOTICE);
    }
    out
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
