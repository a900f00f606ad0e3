//! Application layer - Recorder use cases and port interfaces
//!
//! Contains the session manager, the presentation controller, and the
//! trait definitions for the host's capture and playback facilities.

pub mod controller;
pub mod ports;
pub mod session;
pub mod timer;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export use cases
pub use controller::{
    ControllerEvent, ControllerEvents, ControllerSettings, ControllerView, PresentationController,
};
pub use session::SessionManager;
pub use timer::{ElapsedTimer, DEFAULT_TICK_PERIOD};
