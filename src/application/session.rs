//! Recorder session manager
//!
//! Owns the lifecycle of one capture session: acquire a device stream,
//! start the pipeline, buffer its chunks, and finalize them into a single
//! recording. Every path that ends a session stops the stream's tracks.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::domain::recording::{AudioMimeType, FinalizedRecording};

use super::ports::{
    CaptureConstraints, CaptureHost, CapturePipeline, CaptureStartError, CaptureStream,
    PipelineEvent, StopError,
};

/// State of one running capture, created per `start`
struct ActiveSession<S, P> {
    stream: S,
    pipeline: P,
    mime_type: AudioMimeType,
    chunks: Vec<Vec<u8>>,
    events: UnboundedReceiver<PipelineEvent>,
    failure: Option<String>,
}

impl<S: CaptureStream, P: CapturePipeline> ActiveSession<S, P> {
    fn record(&mut self, event: PipelineEvent) -> bool {
        match event {
            PipelineEvent::DataAvailable(chunk) => {
                debug!(bytes = chunk.len(), "chunk available");
                self.chunks.push(chunk);
                false
            }
            PipelineEvent::Failed(message) => {
                warn!(error = %message, "capture pipeline failed");
                self.failure = Some(message);
                false
            }
            PipelineEvent::Stopped => true,
        }
    }

    fn release(&mut self) {
        self.stream.stop_tracks();
    }
}

/// Mediates access to the capture host and produces finalized recordings
pub struct SessionManager<H: CaptureHost> {
    host: H,
    active: Option<ActiveSession<H::Stream, H::Pipeline>>,
}

impl<H: CaptureHost> SessionManager<H> {
    pub fn new(host: H) -> Self {
        Self { host, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of chunks buffered for the current session
    pub fn buffered_chunks(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.chunks.len())
    }

    /// Acquire the input device and begin capture.
    ///
    /// Returns only once the pipeline is recording.
    pub async fn start(&mut self) -> Result<(), CaptureStartError> {
        if !self.host.supports_capture() {
            return Err(CaptureStartError::CapabilityUnavailable);
        }
        if self.active.is_some() {
            return Err(CaptureStartError::InvalidState);
        }

        let mut stream = self.host.acquire(CaptureConstraints::audio_only()).await?;
        debug!(tracks = stream.track_count(), "device stream acquired");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut pipeline = match self.host.open_pipeline(&stream, events_tx) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                stream.stop_tracks();
                return Err(e);
            }
        };

        if let Err(e) = pipeline.start() {
            stream.stop_tracks();
            return Err(e);
        }

        let mime_type = pipeline.mime_type();
        info!(mime_type = %mime_type, "capture started");

        self.active = Some(ActiveSession {
            stream,
            pipeline,
            mime_type,
            chunks: Vec::new(),
            events: events_rx,
            failure: None,
        });
        Ok(())
    }

    /// Move chunks the pipeline has already delivered into the buffer.
    ///
    /// # Returns
    /// How many chunks were added
    pub fn pump(&mut self) -> usize {
        let Some(session) = self.active.as_mut() else {
            return 0;
        };

        let mut added = 0;
        loop {
            match session.events.try_recv() {
                Ok(PipelineEvent::DataAvailable(chunk)) => {
                    session.chunks.push(chunk);
                    added += 1;
                }
                Ok(event) => {
                    session.record(event);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        added
    }

    /// Flush the pipeline, finalize every buffered chunk, and release the device.
    pub async fn stop(&mut self) -> Result<FinalizedRecording, StopError> {
        let mut session = self.active.take().ok_or(StopError::InvalidState)?;

        if let Err(e) = session.pipeline.stop() {
            session.release();
            return Err(e);
        }

        // The last chunk arrives after the stop request; finalize only after Stopped.
        while let Some(event) = session.events.recv().await {
            if session.record(event) {
                break;
            }
        }

        session.release();

        if let Some(message) = session.failure.take() {
            return Err(StopError::Capture(message));
        }

        let recording = FinalizedRecording::from_chunks(session.chunks, session.mime_type);
        info!(
            size = %recording.human_readable_size(),
            mime_type = %recording.mime_type(),
            "recording finalized"
        );
        Ok(recording)
    }

    /// Halt capture, release the device, and discard buffered chunks.
    /// No-op when no session is active.
    pub fn cancel(&mut self) {
        let Some(mut session) = self.active.take() else {
            return;
        };

        session.pipeline.abort();
        session.release();
        info!(discarded_chunks = session.chunks.len(), "capture cancelled");
    }
}

impl<H: CaptureHost> Drop for SessionManager<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
