//! Presentation state

mod state;

pub use state::{ControllerSession, InvalidStateTransition, RecordingState};
