//! Recurring elapsed-time tick for active recordings

use std::time::{Duration as StdDuration, Instant};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};

use crate::domain::recording::ElapsedTime;

use super::controller::{ControllerEvent, ControllerEvents};

/// Default tick period for the elapsed-time readout
pub const DEFAULT_TICK_PERIOD: StdDuration = StdDuration::from_secs(1);

/// Sends `ControllerEvent::Tick` once per period until dropped.
///
/// Elapsed time is always measured from `started_at`, the instant capture
/// actually began, so late ticks never accumulate drift. Dropping the timer
/// cancels it.
#[derive(Debug)]
pub struct ElapsedTimer {
    started_at: Instant,
    handle: JoinHandle<()>,
}

impl ElapsedTimer {
    /// Arm the timer. Must be called from within a tokio runtime.
    pub fn arm(started_at: Instant, period: StdDuration, events: ControllerEvents) -> Self {
        let handle = tokio::spawn(async move {
            let first = tokio::time::Instant::now() + period;
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if events.send(ControllerEvent::Tick(Instant::now())).is_err() {
                    break;
                }
            }
        });

        Self { started_at, handle }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed_at(&self, now: Instant) -> ElapsedTime {
        ElapsedTime::between(self.started_at, now)
    }

}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
