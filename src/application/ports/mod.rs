//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod download;
pub mod playback;

// Re-export common types
pub use capture::{
    CaptureConstraints, CaptureHost, CapturePipeline, CaptureStartError, CaptureStream,
    PipelineEvent, PipelineEvents, StopError,
};
pub use config::ConfigStore;
pub use download::{DownloadError, DownloadSink};
pub use playback::{PlaybackElement, PlaybackError};
