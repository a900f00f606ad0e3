//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces:
//! cpal for capture, rodio for playback, and the filesystem for
//! downloads and configuration.

pub mod capture;
pub mod config;
pub mod download;
pub mod playback;

// Re-export adapters
pub use capture::CpalCaptureHost;
pub use config::XdgConfigStore;
pub use download::FsDownloadSink;
pub use playback::{create_player, NoOpPlayer, RodioPlayer};
