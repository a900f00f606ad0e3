//! Playback infrastructure adapters

mod noop;
mod rodio_player;

pub use noop::NoOpPlayer;
pub use rodio_player::RodioPlayer;

use tracing::warn;

use crate::application::ports::PlaybackElement;
use crate::application::ControllerEvents;

/// Create a playback element, falling back to no-op when playback is
/// disabled or the output device cannot be opened
pub fn create_player(enabled: bool, events: ControllerEvents) -> Box<dyn PlaybackElement> {
    if !enabled {
        return Box::new(NoOpPlayer::new(events));
    }

    match RodioPlayer::new(events.clone()) {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!(error = %e, "playback unavailable, recordings will only be downloadable");
            Box::new(NoOpPlayer::new(events))
        }
    }
}
