//! Playback port interface

use thiserror::Error;

use crate::domain::recording::FinalizedRecording;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Audio output not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Recording could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port for the media element that plays finalized recordings.
///
/// Implementations report completion by sending
/// `ControllerEvent::PlaybackEnded` on the channel they were built with.
pub trait PlaybackElement: Send {
    /// Replace the current source with `recording`, leaving it paused
    fn load(&mut self, recording: &FinalizedRecording) -> Result<(), PlaybackError>;

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;
}

impl<T: PlaybackElement + ?Sized> PlaybackElement for Box<T> {
    fn load(&mut self, recording: &FinalizedRecording) -> Result<(), PlaybackError> {
        (**self).load(recording)
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
}
