//! Rodio-based playback element
//!
//! rodio's `OutputStream` is not Send, so the stream and its sink live on a
//! dedicated thread that takes commands over a channel. The thread also
//! watches the sink and reports `PlaybackEnded` once it drains.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::application::ports::{PlaybackElement, PlaybackError};
use crate::application::{ControllerEvent, ControllerEvents};
use crate::domain::recording::FinalizedRecording;

/// How often the playback thread checks whether the sink has drained
const END_POLL_INTERVAL: Duration = Duration::from_millis(100);

type Reply = mpsc::Sender<Result<(), PlaybackError>>;

enum Command {
    Load(Arc<[u8]>, Reply),
    Play(Reply),
    Pause,
    Shutdown,
}

/// Plays finalized recordings on the default output device
pub struct RodioPlayer {
    commands: mpsc::Sender<Command>,
    paused: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl RodioPlayer {
    /// Open the default output device
    pub fn new(events: ControllerEvents) -> Result<Self, PlaybackError> {
        let (commands, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let paused = Arc::new(AtomicBool::new(true));

        let worker_paused = Arc::clone(&paused);
        let worker = std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(opened) => opened,
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlaybackError::DeviceNotAvailable(e.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                run_playback(&handle, &command_rx, &worker_paused, &events);
            })
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands,
                paused,
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => Err(PlaybackError::DeviceNotAvailable(
                "playback thread exited".to_string(),
            )),
        }
    }

    fn request(&self, build: impl FnOnce(Reply) -> Command) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(build(reply_tx))
            .map_err(|_| PlaybackError::PlaybackFailed("playback thread stopped".to_string()))?;
        reply_rx
            .recv()
            .map_err(|_| PlaybackError::PlaybackFailed("playback thread stopped".to_string()))?
    }
}

impl PlaybackElement for RodioPlayer {
    fn load(&mut self, recording: &FinalizedRecording) -> Result<(), PlaybackError> {
        self.paused.store(true, Ordering::SeqCst);
        let bytes = recording.shared_data();
        self.request(|reply| Command::Load(bytes, reply))
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.request(Command::Play)?;
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.paused.store(true, Ordering::SeqCst);
        let _ = self.commands.send(Command::Pause);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("playback thread panicked");
            }
        }
    }
}

fn run_playback(
    handle: &OutputStreamHandle,
    commands: &mpsc::Receiver<Command>,
    paused: &AtomicBool,
    events: &ControllerEvents,
) {
    let mut sink: Option<Sink> = None;
    let mut awaiting_end = false;

    loop {
        match commands.recv_timeout(END_POLL_INTERVAL) {
            Ok(Command::Load(bytes, reply)) => {
                // Dropping the previous sink silences it.
                sink = None;
                awaiting_end = false;
                let result = load_sink(handle, bytes).map(|loaded| sink = Some(loaded));
                let _ = reply.send(result);
            }
            Ok(Command::Play(reply)) => {
                let result = match &sink {
                    Some(loaded) => {
                        loaded.play();
                        awaiting_end = true;
                        Ok(())
                    }
                    None => Err(PlaybackError::PlaybackFailed("nothing loaded".to_string())),
                };
                let _ = reply.send(result);
            }
            Ok(Command::Pause) => {
                if let Some(loaded) = &sink {
                    loaded.pause();
                }
                awaiting_end = false;
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if awaiting_end && sink.as_ref().is_some_and(Sink::empty) {
            awaiting_end = false;
            paused.store(true, Ordering::SeqCst);
            debug!("playback finished");
            if events.send(ControllerEvent::PlaybackEnded).is_err() {
                break;
            }
        }
    }
}

fn decode(bytes: Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, PlaybackError> {
    Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::DecodeFailed(e.to_string()))
}

/// Build a paused sink holding the decoded recording
fn load_sink(handle: &OutputStreamHandle, bytes: Arc<[u8]>) -> Result<Sink, PlaybackError> {
    let source = decode(bytes)?;
    let sink = Sink::try_new(handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
    sink.pause();
    sink.append(source);
    Ok(sink)
}
