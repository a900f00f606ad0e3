//! Presentation controller
//!
//! Drives what the user sees: idle, recording with a running elapsed-time
//! readout, or playing back the last recording. Delegates capture to the
//! session manager and playback to a `PlaybackElement`.

use std::time::{Duration as StdDuration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::domain::controller::{ControllerSession, RecordingState};
use crate::domain::recording::{
    DownloadLink, ElapsedTime, FinalizedRecording, MaxRecordingHours, DEFAULT_DOWNLOAD_FILENAME,
};

use super::ports::{CaptureHost, CaptureStartError, PlaybackElement, StopError};
use super::session::SessionManager;
use super::timer::{ElapsedTimer, DEFAULT_TICK_PERIOD};

/// Events delivered to the controller from timers and the playback element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    Tick(Instant),
    PlaybackEnded,
}

pub type ControllerEvents = UnboundedSender<ControllerEvent>;

/// Controller settings
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Hour count at which a recording stops by itself
    pub max_recording_hours: MaxRecordingHours,
    /// Suggested filename for the download link
    pub download_filename: String,
    /// Elapsed-time readout period
    pub tick_period: StdDuration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_recording_hours: MaxRecordingHours::default(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

/// Snapshot of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerView {
    pub state: RecordingState,
    pub elapsed: ElapsedTime,
    pub download_available: bool,
    pub unsupported_overlay: bool,
}

pub struct PresentationController<H: CaptureHost, P: PlaybackElement> {
    session: SessionManager<H>,
    player: P,
    status: ControllerSession,
    settings: ControllerSettings,
    events: ControllerEvents,
    timer: Option<ElapsedTimer>,
    elapsed: ElapsedTime,
    auto_stop_fired: bool,
    download_offered: bool,
    last_recording: Option<FinalizedRecording>,
    unsupported_overlay: bool,
}

impl<H: CaptureHost, P: PlaybackElement> PresentationController<H, P> {
    pub fn new(host: H, player: P, settings: ControllerSettings, events: ControllerEvents) -> Self {
        Self {
            session: SessionManager::new(host),
            player,
            status: ControllerSession::new(),
            settings,
            events,
            timer: None,
            elapsed: ElapsedTime::zero(),
            auto_stop_fired: false,
            download_offered: false,
            last_recording: None,
            unsupported_overlay: false,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.status.state()
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    /// Link to the last recording, built on request
    pub fn download_link(&self) -> Option<DownloadLink> {
        if !self.download_offered {
            return None;
        }
        self.last_recording.as_ref().map(|recording| {
            DownloadLink::for_recording(recording, self.settings.download_filename.as_str())
        })
    }

    pub fn last_recording(&self) -> Option<&FinalizedRecording> {
        self.last_recording.as_ref()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Instant the current recording's capture began
    pub fn recording_started_at(&self) -> Option<Instant> {
        self.timer.as_ref().map(ElapsedTimer::started_at)
    }

    pub fn view(&self) -> ControllerView {
        ControllerView {
            state: self.status.state(),
            elapsed: self.elapsed,
            download_available: self.download_offered && self.last_recording.is_some(),
            unsupported_overlay: self.unsupported_overlay,
        }
    }

    pub fn dismiss_overlay(&mut self) {
        self.unsupported_overlay = false;
    }

    /// Start a new recording, pausing any playback first.
    ///
    /// Failures leave the controller idle. Only `CapabilityUnavailable`
    /// raises the overlay; every other cause is logged.
    pub async fn start_recording(&mut self) -> Result<(), CaptureStartError> {
        if self.status.is_recording() {
            debug!("start ignored, already recording");
            return Ok(());
        }

        self.download_offered = false;
        self.last_recording = None;
        if !self.player.is_paused() {
            self.player.pause();
        }
        if self.status.is_playing() {
            if let Err(e) = self.status.interrupt_playback() {
                warn!(error = %e, "could not leave playback");
            }
        }

        match self.session.start().await {
            Ok(()) => {
                let started_at = Instant::now();
                if let Err(e) = self.status.begin_recording() {
                    warn!(error = %e, "unexpected state at recording start");
                }
                self.elapsed = ElapsedTime::zero();
                self.auto_stop_fired = false;
                self.timer = Some(ElapsedTimer::arm(
                    started_at,
                    self.settings.tick_period,
                    self.events.clone(),
                ));
                info!("recording started");
                Ok(())
            }
            Err(e) => {
                log_start_failure(&e);
                if e == CaptureStartError::CapabilityUnavailable {
                    self.unsupported_overlay = true;
                }
                Err(e)
            }
        }
    }

    /// Finalize the recording, play it, and offer it for download.
    ///
    /// On failure the state is left as it was: the recording controls stay
    /// visible even though no capture is running.
    pub async fn stop_recording(&mut self) -> Result<(), StopError> {
        let recording = match self.session.stop().await {
            Ok(recording) => recording,
            Err(e) => {
                match &e {
                    StopError::InvalidState => warn!("stop requested with no recording in progress"),
                    StopError::Capture(message) => error!(error = %message, "recording failed"),
                }
                return Err(e);
            }
        };

        self.timer = None;
        if let Err(e) = self.status.finish_recording() {
            warn!(error = %e, "unexpected state at recording stop");
        }

        let played = self
            .player
            .load(&recording)
            .and_then(|()| self.player.play());
        if let Err(e) = played {
            error!(error = %e, "could not play recording");
            self.status.reset();
        }

        self.last_recording = Some(recording);
        self.download_offered = true;
        Ok(())
    }

    /// Discard the current recording. Never fails.
    ///
    /// Playback of an earlier recording is left untouched.
    pub fn cancel_recording(&mut self) {
        self.session.cancel();
        self.timer = None;
        if self.status.is_recording() {
            if let Err(e) = self.status.abandon_recording() {
                warn!(error = %e, "unexpected state at cancel");
            }
            info!("recording cancelled");
        }
    }

    pub fn playback_ended(&mut self) {
        if let Err(e) = self.status.playback_ended() {
            debug!(error = %e, "ignoring playback end");
        }
    }

    /// Refresh the elapsed-time readout and enforce the maximum length.
    ///
    /// # Returns
    /// Whether this tick stopped the recording
    pub async fn tick(&mut self, now: Instant) -> bool {
        let Some(timer) = self.timer.as_ref() else {
            return false;
        };
        if !self.status.is_recording() {
            return false;
        }

        self.elapsed = timer.elapsed_at(now);
        self.session.pump();

        let max_hours = self.settings.max_recording_hours.get();
        if self.auto_stop_fired || !self.elapsed.reached_hours(max_hours) {
            return false;
        }

        self.auto_stop_fired = true;
        warn!(elapsed = %self.elapsed, max_hours, "maximum recording time reached, stopping");
        self.stop_recording().await.is_ok()
    }

    pub async fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Tick(now) => {
                self.tick(now).await;
            }
            ControllerEvent::PlaybackEnded => self.playback_ended(),
        }
    }

    /// Release the device and silence playback before exit
    pub fn shutdown(&mut self) {
        self.cancel_recording();
        if !self.player.is_paused() {
            self.player.pause();
        }
    }
}

fn log_start_failure(error: &CaptureStartError) {
    let kind = error.kind();
    match error {
        CaptureStartError::CapabilityUnavailable => {
            info!(kind, "audio capture unavailable, use a host with a working audio input")
        }
        CaptureStartError::Aborted => warn!(kind, "capture request aborted"),
        CaptureStartError::PermissionDenied => {
            warn!(kind, "capture not allowed, the user may have denied permission")
        }
        CaptureStartError::DeviceNotFound => warn!(kind, "no audio input device found"),
        CaptureStartError::DeviceUnreadable => warn!(kind, "audio input device could not be read"),
        CaptureStartError::SecurityRestricted => warn!(kind, "capture blocked by security policy"),
        CaptureStartError::InvalidArgument => warn!(kind, "capture request rejected as invalid"),
        CaptureStartError::InvalidState => warn!(kind, "capture pipeline in invalid state"),
        CaptureStartError::UnknownCaptureError(message) => {
            warn!(kind, error = %message, "unknown capture error")
        }
        CaptureStartError::UnknownStartError(message) => {
            warn!(kind, error = %message, "capture failed to start")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{FakeHost, FakePlayer, HostMonitor, PlayerLog};
    use crate::application::ports::PlaybackError;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    type Controller = PresentationController<FakeHost, FakePlayer>;

    struct Harness {
        controller: Controller,
        host: HostMonitor,
        player: Arc<Mutex<PlayerLog>>,
        _events: UnboundedReceiver<ControllerEvent>,
    }

    fn harness_with(host: FakeHost, player: FakePlayer) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let host_monitor = host.monitor();
        let player_log = player.log();
        let settings = ControllerSettings {
            tick_period: StdDuration::from_secs(3600),
            ..Default::default()
        };
        Harness {
            controller: PresentationController::new(host, player, settings, tx),
            host: host_monitor,
            player: player_log,
            _events: rx,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeHost::new(), FakePlayer::new())
    }

    #[tokio::test]
    async fn start_enters_recording_with_timer() {
        let mut h = harness();

        h.controller.start_recording().await.unwrap();

        let view = h.controller.view();
        assert_eq!(view.state, RecordingState::Recording);
        assert_eq!(view.elapsed.to_string(), "00:00");
        assert!(!view.download_available);
        assert!(h.controller.is_timer_armed());
    }

    #[tokio::test]
    async fn unsupported_host_shows_overlay_without_acquiring() {
        let mut h = harness_with(FakeHost::unsupported(), FakePlayer::new());

        let err = h.controller.start_recording().await.unwrap_err();

        assert_eq!(err, CaptureStartError::CapabilityUnavailable);
        assert_eq!(h.host.acquire_calls(), 0);
        let view = h.controller.view();
        assert_eq!(view.state, RecordingState::Idle);
        assert!(view.unsupported_overlay);
        assert!(!h.controller.is_timer_armed());

        h.controller.dismiss_overlay();
        assert!(!h.controller.view().unsupported_overlay);
    }

    #[tokio::test]
    async fn other_start_failures_are_not_surfaced() {
        let mut h = harness_with(
            FakeHost::failing(CaptureStartError::PermissionDenied),
            FakePlayer::new(),
        );

        let err = h.controller.start_recording().await.unwrap_err();

        assert_eq!(err, CaptureStartError::PermissionDenied);
        let view = h.controller.view();
        assert_eq!(view.state, RecordingState::Idle);
        assert!(!view.unsupported_overlay);
    }

    #[tokio::test]
    async fn record_two_chunks_then_stop_plays_and_offers_download() {
        let mut h = harness();

        h.controller.start_recording().await.unwrap();
        h.host.emit(vec![1, 2, 3]);
        h.host.emit(vec![4, 5]);
        h.controller.stop_recording().await.unwrap();

        let view = h.controller.view();
        assert_eq!(view.state, RecordingState::Playing);
        assert!(view.download_available);
        assert!(!h.controller.is_timer_armed());

        let recording = h.controller.last_recording().unwrap();
        assert_eq!(recording.size_bytes(), 5);
        assert_eq!(recording.data(), &[1, 2, 3, 4, 5]);

        let link = h.controller.download_link().unwrap();
        assert_eq!(link.filename(), "myfile.mp3");
        assert_eq!(link.resolve().unwrap().1, vec![1, 2, 3, 4, 5]);

        let log = h.player.lock().unwrap();
        assert_eq!(log.loaded.len(), 1);
        assert_eq!(log.plays, 1);
        assert!(!log.paused);
        assert_eq!(h.host.track_stops(), 1);
    }

    #[tokio::test]
    async fn restarting_while_playing_pauses_and_hides_download() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.host.emit(vec![7]);
        h.controller.stop_recording().await.unwrap();
        assert_eq!(h.controller.state(), RecordingState::Playing);

        h.controller.start_recording().await.unwrap();

        assert_eq!(h.controller.state(), RecordingState::Recording);
        assert!(h.controller.download_link().is_none());
        let log = h.player.lock().unwrap();
        assert_eq!(log.pauses, 1);
        assert!(log.paused);
    }

    #[tokio::test]
    async fn player_and_download_share_the_recording() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.host.emit(vec![4, 2]);
        h.controller.stop_recording().await.unwrap();

        let kept = h.controller.last_recording().unwrap().shared_data();
        let log = h.player.lock().unwrap();
        assert!(Arc::ptr_eq(&log.loaded[0].shared_data(), &kept));
        drop(log);

        h.controller.start_recording().await.unwrap();
        assert!(h.controller.last_recording().is_none());
        assert!(!h.controller.view().download_available);
    }

    #[tokio::test]
    async fn start_while_recording_is_ignored() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();

        h.controller.start_recording().await.unwrap();

        assert_eq!(h.controller.state(), RecordingState::Recording);
        assert_eq!(h.host.acquire_calls(), 1);
    }

    #[tokio::test]
    async fn restart_then_cancel_leaves_idle_without_download() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.controller.stop_recording().await.unwrap();
        assert!(h.controller.download_link().is_some());

        h.controller.start_recording().await.unwrap();
        h.controller.cancel_recording();

        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert!(h.controller.download_link().is_none());
        assert!(h.player.lock().unwrap().paused);
    }

    #[tokio::test]
    async fn cancel_while_recording_releases_device() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.host.emit(vec![1]);

        h.controller.cancel_recording();

        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert!(!h.controller.is_timer_armed());
        assert!(h.controller.download_link().is_none());
        assert_eq!(h.host.track_stops(), 1);
    }

    #[tokio::test]
    async fn cancel_when_idle_is_harmless() {
        let mut h = harness();
        h.controller.cancel_recording();
        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert_eq!(h.host.track_stops(), 0);
    }

    #[tokio::test]
    async fn cancel_does_not_interrupt_playback() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.controller.stop_recording().await.unwrap();

        h.controller.cancel_recording();

        assert_eq!(h.controller.state(), RecordingState::Playing);
        assert!(h.controller.download_link().is_some());
        assert_eq!(h.player.lock().unwrap().pauses, 0);
    }

    #[tokio::test]
    async fn stop_without_recording_is_logged_and_ignored() {
        let mut h = harness();
        let err = h.controller.stop_recording().await.unwrap_err();
        assert_eq!(err, StopError::InvalidState);
        assert_eq!(h.controller.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn stop_failure_keeps_recording_state() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.host.fail("device unplugged");

        let err = h.controller.stop_recording().await.unwrap_err();

        assert!(matches!(err, StopError::Capture(_)));
        assert_eq!(h.controller.state(), RecordingState::Recording);
        assert!(h.controller.download_link().is_none());
        assert_eq!(h.host.track_stops(), 1);
    }

    #[tokio::test]
    async fn playback_end_returns_to_idle_and_keeps_download() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        h.controller.stop_recording().await.unwrap();

        h.controller.handle_event(ControllerEvent::PlaybackEnded).await;

        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert!(h.controller.view().download_available);
    }

    #[tokio::test]
    async fn playback_end_during_recording_is_ignored() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();

        h.controller.handle_event(ControllerEvent::PlaybackEnded).await;

        assert_eq!(h.controller.state(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn unplayable_recording_is_still_downloadable() {
        let mut h = harness_with(
            FakeHost::new(),
            FakePlayer::failing_load(PlaybackError::DecodeFailed("bad header".into())),
        );
        h.controller.start_recording().await.unwrap();
        h.host.emit(vec![1]);

        h.controller.stop_recording().await.unwrap();

        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert!(h.controller.download_link().is_some());
    }

    #[tokio::test]
    async fn tick_updates_elapsed_from_start_instant() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        let started_at = h.controller.recording_started_at().unwrap();

        let stopped = h
            .controller
            .tick(started_at + StdDuration::from_secs(75))
            .await;

        assert!(!stopped);
        assert_eq!(h.controller.elapsed().to_string(), "01:15");
        assert_eq!(h.controller.state(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn tick_buffers_delivered_chunks() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        let started_at = h.controller.recording_started_at().unwrap();
        h.host.emit(vec![1, 2]);

        h.controller.tick(started_at + StdDuration::from_secs(1)).await;
        h.controller.stop_recording().await.unwrap();

        assert_eq!(h.controller.last_recording().unwrap().data(), &[1, 2]);
    }

    #[tokio::test]
    async fn reaching_max_hours_stops_exactly_once() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();
        let started_at = h.controller.recording_started_at().unwrap();
        h.host.emit(vec![3, 3]);

        let before = h
            .controller
            .tick(started_at + StdDuration::from_secs(3599))
            .await;
        assert!(!before);
        assert_eq!(h.controller.elapsed().to_string(), "59:59");
        assert_eq!(h.controller.state(), RecordingState::Recording);

        let at_limit = h
            .controller
            .tick(started_at + StdDuration::from_secs(3600))
            .await;
        assert!(at_limit);
        assert_eq!(h.controller.elapsed().to_string(), "01:00:00");
        assert_eq!(h.controller.state(), RecordingState::Playing);
        assert!(!h.controller.is_timer_armed());

        let after = h
            .controller
            .tick(started_at + StdDuration::from_secs(3601))
            .await;
        assert!(!after);
        assert_eq!(h.player.lock().unwrap().loaded.len(), 1);
        assert_eq!(h.host.acquire_calls(), 1);
    }

    #[tokio::test]
    async fn configured_max_hours_is_respected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let settings = ControllerSettings {
            max_recording_hours: MaxRecordingHours::new(2),
            tick_period: StdDuration::from_secs(3600),
            ..Default::default()
        };
        let mut controller = PresentationController::new(FakeHost::new(), FakePlayer::new(), settings, tx);
        controller.start_recording().await.unwrap();
        let started_at = controller.recording_started_at().unwrap();

        assert!(!controller.tick(started_at + StdDuration::from_secs(3600)).await);
        assert_eq!(controller.state(), RecordingState::Recording);
        assert!(controller.tick(started_at + StdDuration::from_secs(7200)).await);
        assert_eq!(controller.state(), RecordingState::Playing);
    }

    #[tokio::test]
    async fn stale_tick_while_idle_is_ignored() {
        let mut h = harness();
        let stopped = h.controller.tick(Instant::now()).await;
        assert!(!stopped);
        assert_eq!(h.controller.elapsed(), ElapsedTime::zero());
    }

    #[tokio::test]
    async fn custom_download_filename() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let settings = ControllerSettings {
            download_filename: "take-1.flac".to_string(),
            tick_period: StdDuration::from_secs(3600),
            ..Default::default()
        };
        let mut controller = PresentationController::new(FakeHost::new(), FakePlayer::new(), settings, tx);
        controller.start_recording().await.unwrap();
        controller.stop_recording().await.unwrap();

        assert_eq!(controller.download_link().unwrap().filename(), "take-1.flac");
    }

    #[tokio::test]
    async fn shutdown_releases_device() {
        let mut h = harness();
        h.controller.start_recording().await.unwrap();

        h.controller.shutdown();

        assert_eq!(h.controller.state(), RecordingState::Idle);
        assert_eq!(h.host.track_stops(), 1);
    }
}
