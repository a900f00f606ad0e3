//! Capture port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::recording::AudioMimeType;

/// Why a capture session could not be started.
///
/// Adapters map platform failures onto these variants at the acquisition
/// boundary so callers can branch on the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureStartError {
    #[error("Audio capture is not supported on this host")]
    CapabilityUnavailable,

    #[error("Audio capture was aborted")]
    Aborted,

    #[error("Permission to capture audio was denied")]
    PermissionDenied,

    #[error("No audio input device found")]
    DeviceNotFound,

    #[error("Audio input device could not be read")]
    DeviceUnreadable,

    #[error("Audio capture is blocked by a security restriction")]
    SecurityRestricted,

    #[error("Invalid capture request")]
    InvalidArgument,

    #[error("Capture pipeline is in an invalid state")]
    InvalidState,

    #[error("Unknown capture error: {0}")]
    UnknownCaptureError(String),

    #[error("Failed to start recording: {0}")]
    UnknownStartError(String),
}

impl CaptureStartError {
    /// Map a platform error identifier (e.g. `NotAllowedError`) to a variant.
    /// Unrecognized identifiers become `UnknownStartError`.
    pub fn from_platform_name(name: &str, message: impl Into<String>) -> Self {
        match name {
            "AbortError" => Self::Aborted,
            "NotAllowedError" => Self::PermissionDenied,
            "NotFoundError" => Self::DeviceNotFound,
            "NotReadableError" => Self::DeviceUnreadable,
            "SecurityError" => Self::SecurityRestricted,
            "TypeError" => Self::InvalidArgument,
            "InvalidStateError" => Self::InvalidState,
            "UnknownError" => Self::UnknownCaptureError(message.into()),
            other => Self::UnknownStartError(format!("{}: {}", other, message.into())),
        }
    }

    /// Short identifier used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => "capability_unavailable",
            Self::Aborted => "aborted",
            Self::PermissionDenied => "permission_denied",
            Self::DeviceNotFound => "device_not_found",
            Self::DeviceUnreadable => "device_unreadable",
            Self::SecurityRestricted => "security_restricted",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidState => "invalid_state",
            Self::UnknownCaptureError(_) => "unknown_capture_error",
            Self::UnknownStartError(_) => "unknown_start_error",
        }
    }
}

/// Why a capture session could not be finalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopError {
    #[error("No recording in progress")]
    InvalidState,

    #[error("Recording failed: {0}")]
    Capture(String),
}

/// What a device acquisition asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
}

impl CaptureConstraints {
    pub const fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }
}

/// Notifications emitted by a capture pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Next chunk of encoded audio
    DataAvailable(Vec<u8>),
    /// Capture failed; no further data will follow
    Failed(String),
    /// Pipeline halted after flushing its last chunk
    Stopped,
}

/// Sender handed to a pipeline when it is opened
pub type PipelineEvents = UnboundedSender<PipelineEvent>;

/// Live input stream granted by the host
pub trait CaptureStream: Send {
    /// Stop every track, releasing the device. Must be idempotent.
    fn stop_tracks(&mut self);

    fn track_count(&self) -> usize;

    /// Whether any track is still running
    fn is_live(&self) -> bool;
}

/// Recording pipeline bound to a live stream
pub trait CapturePipeline: Send {
    /// Encoding negotiated for the emitted chunks
    fn mime_type(&self) -> AudioMimeType;

    /// Begin delivering `DataAvailable` events
    fn start(&mut self) -> Result<(), CaptureStartError>;

    /// Request a flush of buffered data followed by `Stopped`.
    /// Returns immediately; the events arrive asynchronously.
    fn stop(&mut self) -> Result<(), StopError>;

    /// Halt and drop buffered data. Emits no further events.
    fn abort(&mut self);

    fn is_recording(&self) -> bool;
}

/// Port for the host's audio capture facilities
#[async_trait]
pub trait CaptureHost: Send + Sync {
    type Stream: CaptureStream;
    type Pipeline: CapturePipeline;

    /// Synchronous check: can this host capture audio at all
    fn supports_capture(&self) -> bool;

    /// Ask for a live input stream. Cannot be aborted once requested.
    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Self::Stream, CaptureStartError>;

    /// Open a recording pipeline that reports through `events`
    fn open_pipeline(
        &self,
        stream: &Self::Stream,
        events: PipelineEvents,
    ) -> Result<Self::Pipeline, CaptureStartError>;
}
