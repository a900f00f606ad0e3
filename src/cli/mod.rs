//! CLI layer - Command-line interface
//!
//! Contains argument parsing, interactive command parsing, output
//! formatting, signal handling, and the interactive recorder runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod input;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_interactive, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, RecorderOptions};
pub use input::UserAction;
pub use presenter::Presenter;
