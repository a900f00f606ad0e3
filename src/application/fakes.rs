//! In-memory port implementations for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::recording::{AudioMimeType, FinalizedRecording};

use super::ports::{
    CaptureConstraints, CaptureHost, CapturePipeline, CaptureStartError, CaptureStream,
    PipelineEvent, PipelineEvents, PlaybackElement, PlaybackError, StopError,
};

#[derive(Default)]
struct HostState {
    acquire_calls: usize,
    track_stops: usize,
    pipeline_stops: usize,
    pipeline_aborts: usize,
    events: Option<PipelineEvents>,
}

/// Capture host whose pipelines are fed by the test through a `HostMonitor`
pub struct FakeHost {
    supported: bool,
    acquire_error: Option<CaptureStartError>,
    pipeline_start_error: Option<CaptureStartError>,
    mime_type: AudioMimeType,
    final_chunk: Option<Vec<u8>>,
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            supported: true,
            acquire_error: None,
            pipeline_start_error: None,
            mime_type: AudioMimeType::Ogg,
            final_chunk: None,
            state: Arc::new(Mutex::new(HostState::default())),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn failing(error: CaptureStartError) -> Self {
        Self {
            acquire_error: Some(error),
            ..Self::new()
        }
    }

    pub fn with_pipeline_start_error(mut self, error: CaptureStartError) -> Self {
        self.pipeline_start_error = Some(error);
        self
    }

    pub fn with_mime_type(mut self, mime_type: AudioMimeType) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_final_chunk(mut self, chunk: Vec<u8>) -> Self {
        self.final_chunk = Some(chunk);
        self
    }

    pub fn monitor(&self) -> HostMonitor {
        HostMonitor {
            state: Arc::clone(&self.state),
        }
    }
}

/// Test-side view of a `FakeHost`
#[derive(Clone)]
pub struct HostMonitor {
    state: Arc<Mutex<HostState>>,
}

impl HostMonitor {
    pub fn acquire_calls(&self) -> usize {
        self.state.lock().unwrap().acquire_calls
    }

    pub fn track_stops(&self) -> usize {
        self.state.lock().unwrap().track_stops
    }

    pub fn pipeline_stops(&self) -> usize {
        self.state.lock().unwrap().pipeline_stops
    }

    pub fn pipeline_aborts(&self) -> usize {
        self.state.lock().unwrap().pipeline_aborts
    }

    /// Deliver a chunk through the most recently opened pipeline
    pub fn emit(&self, chunk: Vec<u8>) {
        self.send(PipelineEvent::DataAvailable(chunk));
    }

    pub fn fail(&self, message: &str) {
        self.send(PipelineEvent::Failed(message.to_string()));
    }

    fn send(&self, event: PipelineEvent) {
        let state = self.state.lock().unwrap();
        let events = state.events.as_ref().expect("no pipeline opened");
        let _ = events.send(event);
    }
}

pub struct FakeStream {
    live: bool,
    state: Arc<Mutex<HostState>>,
}

impl CaptureStream for FakeStream {
    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.state.lock().unwrap().track_stops += 1;
        }
    }

    fn track_count(&self) -> usize {
        1
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

pub struct FakePipeline {
    events: PipelineEvents,
    recording: bool,
    mime_type: AudioMimeType,
    start_error: Option<CaptureStartError>,
    final_chunk: Option<Vec<u8>>,
    state: Arc<Mutex<HostState>>,
}

impl CapturePipeline for FakePipeline {
    fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    fn start(&mut self) -> Result<(), CaptureStartError> {
        if let Some(e) = self.start_error.clone() {
            return Err(e);
        }
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StopError> {
        if !self.recording {
            return Err(StopError::InvalidState);
        }
        self.recording = false;
        self.state.lock().unwrap().pipeline_stops += 1;
        if let Some(chunk) = self.final_chunk.take() {
            let _ = self.events.send(PipelineEvent::DataAvailable(chunk));
        }
        let _ = self.events.send(PipelineEvent::Stopped);
        Ok(())
    }

    fn abort(&mut self) {
        self.recording = false;
        self.final_chunk = None;
        self.state.lock().unwrap().pipeline_aborts += 1;
    }

    fn is_recording(&self) -> bool {
        self.recording
    }
}

#[async_trait]
impl CaptureHost for FakeHost {
    type Stream = FakeStream;
    type Pipeline = FakePipeline;

    fn supports_capture(&self) -> bool {
        self.supported
    }

    async fn acquire(
        &self,
        _constraints: CaptureConstraints,
    ) -> Result<FakeStream, CaptureStartError> {
        self.state.lock().unwrap().acquire_calls += 1;
        if let Some(e) = self.acquire_error.clone() {
            return Err(e);
        }
        Ok(FakeStream {
            live: true,
            state: Arc::clone(&self.state),
        })
    }

    fn open_pipeline(
        &self,
        _stream: &FakeStream,
        events: PipelineEvents,
    ) -> Result<FakePipeline, CaptureStartError> {
        self.state.lock().unwrap().events = Some(events.clone());
        Ok(FakePipeline {
            events,
            recording: false,
            mime_type: self.mime_type,
            start_error: self.pipeline_start_error.clone(),
            final_chunk: self.final_chunk.clone(),
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub struct PlayerLog {
    pub loaded: Vec<FinalizedRecording>,
    pub plays: usize,
    pub pauses: usize,
    pub paused: bool,
}

/// Playback element that only records what it was asked to do
pub struct FakePlayer {
    log: Arc<Mutex<PlayerLog>>,
    load_error: Option<PlaybackError>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(PlayerLog {
                loaded: Vec::new(),
                plays: 0,
                pauses: 0,
                paused: true,
            })),
            load_error: None,
        }
    }

    pub fn failing_load(error: PlaybackError) -> Self {
        Self {
            load_error: Some(error),
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<Mutex<PlayerLog>> {
        Arc::clone(&self.log)
    }
}

impl PlaybackElement for FakePlayer {
    fn load(&mut self, recording: &FinalizedRecording) -> Result<(), PlaybackError> {
        if let Some(e) = self.load_error.clone() {
            return Err(e);
        }
        let mut log = self.log.lock().unwrap();
        log.loaded.push(recording.clone());
        log.paused = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut log = self.log.lock().unwrap();
        log.plays += 1;
        log.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.pauses += 1;
        log.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.log.lock().unwrap().paused
    }
}
