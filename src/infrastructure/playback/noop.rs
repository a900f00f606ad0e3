//! No-op playback element
//!
//! Used when playback is disabled or no output device is available.
//! Every recording "finishes" as soon as it is played.

use crate::application::ports::{PlaybackElement, PlaybackError};
use crate::application::{ControllerEvent, ControllerEvents};
use crate::domain::recording::FinalizedRecording;

pub struct NoOpPlayer {
    events: ControllerEvents,
    loaded: bool,
}

impl NoOpPlayer {
    pub fn new(events: ControllerEvents) -> Self {
        Self {
            events,
            loaded: false,
        }
    }
}

impl PlaybackElement for NoOpPlayer {
    fn load(&mut self, _recording: &FinalizedRecording) -> Result<(), PlaybackError> {
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::PlaybackFailed("nothing loaded".to_string()));
        }
        let _ = self.events.send(ControllerEvent::PlaybackEnded);
        Ok(())
    }

    fn pause(&mut self) {}

    fn is_paused(&self) -> bool {
        true
    }
}
