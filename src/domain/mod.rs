//! Domain layer - Core recorder logic
//!
//! Contains value objects, the UI state machine, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod controller;
pub mod error;
pub mod recording;

// Re-export common types
pub use config::AppConfig;
pub use controller::{ControllerSession, RecordingState};
pub use error::*;
pub use recording::{AudioMimeType, DownloadLink, ElapsedTime, FinalizedRecording, MaxRecordingHours};
