//! ClipRecorder - record, play back and save audio clips
//!
//! This crate provides the core functionality for capturing audio from the
//! default microphone, playing the finished recording back, and saving it
//! through a download link.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the recorder state machine, and errors
//! - **Application**: Session manager, presentation controller, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, filesystem)
//! - **CLI**: Argument parsing, the interactive loop, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
