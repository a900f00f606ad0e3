//! Recorder UI state machine

use std::fmt;
use thiserror::Error;

/// What the recorder is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: RecordingState,
    pub action: String,
}

/// Controller session entity.
/// Guards the transitions between idle, recording and playing.
///
/// State machine:
///   IDLE -> RECORDING (begin_recording)
///   PLAYING -> IDLE (interrupt_playback, playback_ended)
///   RECORDING -> PLAYING (finish_recording)
///   RECORDING -> IDLE (abandon_recording)
#[derive(Debug, Default)]
pub struct ControllerSession {
    state: RecordingState,
}

impl ControllerSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn is_playing(&self) -> bool {
        self.state == RecordingState::Playing
    }

    fn transition(
        &mut self,
        from: RecordingState,
        to: RecordingState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingState::Idle, RecordingState::Recording, "begin recording")
    }

    /// Transition from PLAYING to IDLE when playback is paused for a new recording
    pub fn interrupt_playback(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingState::Playing, RecordingState::Idle, "interrupt playback")
    }

    /// Transition from RECORDING to PLAYING once the recording is finalized
    pub fn finish_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingState::Recording, RecordingState::Playing, "finish recording")
    }

    /// Transition from RECORDING to IDLE without keeping the recording
    pub fn abandon_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingState::Recording, RecordingState::Idle, "abandon recording")
    }

    /// Transition from PLAYING to IDLE when playback completes
    pub fn playback_ended(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecordingState::Playing, RecordingState::Idle, "end playback")
    }

    /// Force IDLE, used when a finalized recording cannot be played
    pub fn reset(&mut self) {
        self.state = RecordingState::Idle;
    }
}
