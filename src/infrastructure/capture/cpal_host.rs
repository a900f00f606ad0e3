//! Cross-platform capture host using cpal
//!
//! Acquiring opens the default input device on a dedicated thread and keeps
//! its stream running until the tracks are stopped (cpal::Stream is not
//! Send, so it never leaves that thread). The pipeline only decides which
//! samples are kept: it buffers mono i16 PCM while recording and, on stop,
//! encodes everything to FLAC on the blocking pool before emitting the chunk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BuildStreamError, PlayStreamError, SampleFormat, StreamConfig, SupportedStreamConfigsError,
};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::flac_encoder::encode_to_flac;
use crate::application::ports::{
    CaptureConstraints, CaptureHost, CapturePipeline, CaptureStartError, CaptureStream,
    PipelineEvent, PipelineEvents, StopError,
};
use crate::domain::recording::AudioMimeType;

/// Sample rate requested when the device's default is unusable
const FALLBACK_SAMPLE_RATE: u32 = 48_000;

/// Samples shared between the capture thread and the pipeline
#[derive(Default)]
struct CaptureBuffer {
    samples: StdMutex<Vec<i16>>,
    recording: AtomicBool,
    failure: StdMutex<Option<String>>,
}

impl CaptureBuffer {
    fn push(&self, mono: &[i16]) {
        if !self.recording.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(mut samples) = self.samples.lock() {
            samples.extend_from_slice(mono);
        }
    }

    fn take_samples(&self) -> Vec<i16> {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *samples)
    }

    fn clear(&self) {
        self.samples.lock().unwrap_or_else(|e| e.into_inner()).clear();
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn fail(&self, message: String) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message);
    }

    fn take_failure(&self) -> Option<String> {
        self.failure.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// Negotiated input format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputFormat {
    sample_rate: u32,
    channels: u16,
}

/// Capture host backed by the platform's default cpal host
pub struct CpalCaptureHost;

impl CpalCaptureHost {
    pub fn new() -> Self {
        Self
    }

    /// Get the default input device
    fn input_device() -> Result<cpal::Device, CaptureStartError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureStartError::DeviceNotFound)
    }

    /// Pick an i16 or f32 configuration, preferring fewer channels and the
    /// device's default rate
    fn input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureStartError> {
        let preferred_rate = device
            .default_input_config()
            .map(|c| c.sample_rate().0)
            .unwrap_or(FALLBACK_SAMPLE_RATE);

        let supported = device.supported_input_configs().map_err(map_configs_error)?;

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }
            let is_better = match &best {
                None => true,
                Some(current) => config.channels() < current.channels(),
            };
            if is_better {
                best = Some(config);
            }
        }

        let range = best.ok_or(CaptureStartError::InvalidArgument)?;
        let sample_rate = preferred_rate
            .clamp(range.min_sample_rate().0, range.max_sample_rate().0);

        let sample_format = range.sample_format();
        let config = StreamConfig {
            channels: range.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, sample_format))
    }

    /// Open and start the input stream; runs on the capture thread
    fn open_stream(
        buffer: &Arc<CaptureBuffer>,
    ) -> Result<(cpal::Stream, InputFormat), CaptureStartError> {
        let device = Self::input_device()?;
        let (config, sample_format) = Self::input_config(&device)?;
        let channels = config.channels;

        let on_error = {
            let buffer = Arc::clone(buffer);
            move |err: cpal::StreamError| {
                warn!(error = %err, "audio stream error");
                buffer.fail(err.to_string());
            }
        };

        let stream = match sample_format {
            SampleFormat::I16 => {
                let buffer = Arc::clone(buffer);
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        buffer.push(&downmix(data, channels));
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::F32 => {
                let buffer = Arc::clone(buffer);
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        buffer.push(&downmix(&f32_to_i16(data), channels));
                    },
                    on_error,
                    None,
                )
            }
            _ => return Err(CaptureStartError::InvalidArgument),
        }
        .map_err(map_build_error)?;

        stream.play().map_err(map_play_error)?;

        Ok((
            stream,
            InputFormat {
                sample_rate: config.sample_rate.0,
                channels,
            },
        ))
    }
}

impl Default for CpalCaptureHost {
    fn default() -> Self {
        Self::new()
    }
}

/// A host can capture only if it enumerates at least one input device
fn has_any_device<I: Iterator>(mut devices: I) -> bool {
    devices.next().is_some()
}

/// Hold the stream open until a stop request arrives
fn run_capture(
    buffer: Arc<CaptureBuffer>,
    ready: oneshot::Sender<Result<InputFormat, CaptureStartError>>,
    stop: std_mpsc::Receiver<()>,
) {
    let (stream, format) = match CpalCaptureHost::open_stream(&buffer) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if ready.send(Ok(format)).is_err() {
        // Requester went away before the device came up.
        return;
    }

    // Either a stop message or a dropped sender ends the capture.
    let _ = stop.recv();
    drop(stream);
    debug!("input stream closed");
}

#[async_trait]
impl CaptureHost for CpalCaptureHost {
    type Stream = CpalStream;
    type Pipeline = CpalPipeline;

    fn supports_capture(&self) -> bool {
        cpal::default_host()
            .input_devices()
            .map(has_any_device)
            .unwrap_or(false)
    }

    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<CpalStream, CaptureStartError> {
        if !constraints.audio || constraints.video {
            return Err(CaptureStartError::InvalidArgument);
        }

        let buffer = Arc::new(CaptureBuffer::default());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel();

        let worker_buffer = Arc::clone(&buffer);
        let worker = std::thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || run_capture(worker_buffer, ready_tx, stop_rx))
            .map_err(|e| CaptureStartError::UnknownStartError(e.to_string()))?;

        let format = match ready_rx.await {
            Ok(result) => result?,
            Err(_) => return Err(CaptureStartError::Aborted),
        };
        debug!(sample_rate = format.sample_rate, channels = format.channels, "input device opened");

        Ok(CpalStream {
            buffer,
            format,
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }

    fn open_pipeline(
        &self,
        stream: &CpalStream,
        events: PipelineEvents,
    ) -> Result<CpalPipeline, CaptureStartError> {
        if !stream.is_live() {
            return Err(CaptureStartError::InvalidState);
        }
        Ok(CpalPipeline::new(
            Arc::clone(&stream.buffer),
            stream.format.sample_rate,
            events,
        ))
    }
}

/// Live default input device
pub struct CpalStream {
    buffer: Arc<CaptureBuffer>,
    format: InputFormat,
    stop: Option<std_mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureStream for CpalStream {
    fn stop_tracks(&mut self) {
        self.buffer.recording.store(false, Ordering::SeqCst);
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture thread panicked");
            }
        }
    }

    fn track_count(&self) -> usize {
        1
    }

    fn is_live(&self) -> bool {
        self.stop.is_some()
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

/// Records from a `CpalStream` and emits one FLAC chunk on stop
pub struct CpalPipeline {
    buffer: Arc<CaptureBuffer>,
    sample_rate: u32,
    events: PipelineEvents,
    recording: bool,
}

impl CpalPipeline {
    fn new(buffer: Arc<CaptureBuffer>, sample_rate: u32, events: PipelineEvents) -> Self {
        Self {
            buffer,
            sample_rate,
            events,
            recording: false,
        }
    }
}

impl CapturePipeline for CpalPipeline {
    fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Flac
    }

    fn start(&mut self) -> Result<(), CaptureStartError> {
        if self.recording {
            return Err(CaptureStartError::InvalidState);
        }
        self.buffer.clear();
        self.buffer.recording.store(true, Ordering::SeqCst);
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StopError> {
        if !self.recording {
            return Err(StopError::InvalidState);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StopError::Capture(e.to_string()))?;
        self.recording = false;
        self.buffer.recording.store(false, Ordering::SeqCst);

        let samples = self.buffer.take_samples();
        let failure = self.buffer.take_failure();
        let sample_rate = self.sample_rate;
        let events = self.events.clone();

        // Encoding an hour of audio takes a while; Stopped reports completion.
        runtime.spawn_blocking(move || flush(samples, sample_rate, failure, &events));
        Ok(())
    }

    fn abort(&mut self) {
        self.recording = false;
        self.buffer.recording.store(false, Ordering::SeqCst);
        self.buffer.clear();
    }

    fn is_recording(&self) -> bool {
        self.recording
    }
}

fn flush(samples: Vec<i16>, sample_rate: u32, failure: Option<String>, events: &PipelineEvents) {
    if let Some(message) = failure {
        let _ = events.send(PipelineEvent::Failed(message));
    } else if !samples.is_empty() {
        debug!(samples = samples.len(), sample_rate, "encoding captured audio");
        match encode_to_flac(&samples, sample_rate) {
            Ok(chunk) => {
                let _ = events.send(PipelineEvent::DataAvailable(chunk));
            }
            Err(e) => {
                let _ = events.send(PipelineEvent::Failed(e.to_string()));
            }
        }
    }
    let _ = events.send(PipelineEvent::Stopped);
}

/// Average interleaved channels down to mono
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

fn map_configs_error(err: SupportedStreamConfigsError) -> CaptureStartError {
    match err {
        SupportedStreamConfigsError::DeviceNotAvailable => CaptureStartError::DeviceNotFound,
        SupportedStreamConfigsError::InvalidArgument => CaptureStartError::InvalidArgument,
        other => CaptureStartError::UnknownCaptureError(other.to_string()),
    }
}

fn map_build_error(err: BuildStreamError) -> CaptureStartError {
    match err {
        BuildStreamError::DeviceNotAvailable => CaptureStartError::DeviceNotFound,
        BuildStreamError::StreamConfigNotSupported | BuildStreamError::InvalidArgument => {
            CaptureStartError::InvalidArgument
        }
        other => CaptureStartError::UnknownCaptureError(other.to_string()),
    }
}

fn map_play_error(err: PlayStreamError) -> CaptureStartError {
    match err {
        PlayStreamError::DeviceNotAvailable => CaptureStartError::DeviceUnreadable,
        other => CaptureStartError::UnknownCaptureError(other.to_string()),
    }
}
