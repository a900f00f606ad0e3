//! Interactive recorder runner

use std::env;
use std::io::BufRead;
use std::process::ExitCode;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::ports::{
    CaptureHost, ConfigStore, DownloadSink, PlaybackElement, StopError,
};
use crate::application::{ControllerSettings, PresentationController, DEFAULT_TICK_PERIOD};
use crate::domain::config::AppConfig;
use crate::infrastructure::{create_player, CpalCaptureHost, FsDownloadSink, XdgConfigStore};

use super::args::RecorderOptions;
use super::input::UserAction;
use super::presenter::Presenter;
use super::signals::wait_for_shutdown;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the download directory
pub const OUTPUT_DIR_ENV: &str = "CLIP_RECORDER_OUTPUT_DIR";

/// Whether the event loop should keep going after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run the interactive recorder until `quit`, end of input, or a signal
pub async fn run_interactive(options: RecorderOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let player = create_player(options.playback, events_tx.clone());
    let settings = ControllerSettings {
        max_recording_hours: options.max_recording_hours,
        download_filename: options.download_filename.clone(),
        tick_period: DEFAULT_TICK_PERIOD,
    };
    let mut controller =
        PresentationController::new(CpalCaptureHost::new(), player, settings, events_tx);
    let sink = FsDownloadSink::new(options.output_dir.clone());

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);
    let mut lines = spawn_stdin_reader();

    presenter.info(&format!(
        "Downloads go to {} as {}",
        options.output_dir.display(),
        options.download_filename
    ));
    presenter.help();

    let exit_code = loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match line.parse::<UserAction>() {
                        Ok(action) => {
                            debug!(%action, "user action");
                            let flow =
                                handle_action(action, &mut controller, &sink, &mut presenter).await;
                            if flow == Flow::Quit {
                                break EXIT_SUCCESS;
                            }
                        }
                        Err(e) => presenter.warn(&e.to_string()),
                    }
                }
                Some(Err(e)) => {
                    presenter.error(&format!("Failed to read input: {}", e));
                    break EXIT_ERROR;
                }
                None => break EXIT_SUCCESS,
            },
            Some(event) = events_rx.recv() => controller.handle_event(event).await,
            signal = &mut shutdown => match signal {
                Ok(signal) => {
                    info!(%signal, "shutting down");
                    break EXIT_SUCCESS;
                }
                Err(e) => {
                    presenter.error(&format!("Failed to setup signal handler: {}", e));
                    break EXIT_ERROR;
                }
            },
        }

        presenter.render(&controller.view(), options.max_recording_hours);
    };

    controller.shutdown();
    presenter.stop_spinner();
    ExitCode::from(exit_code)
}

/// Apply one user action to the controller
pub async fn handle_action<H, P, D>(
    action: UserAction,
    controller: &mut PresentationController<H, P>,
    sink: &D,
    presenter: &mut Presenter,
) -> Flow
where
    H: CaptureHost,
    P: PlaybackElement,
    D: DownloadSink,
{
    match action {
        UserAction::Record => {
            // Failures are logged by the controller; the unsupported
            // notice comes through the rendered view.
            let _ = controller.start_recording().await;
        }
        UserAction::Stop => {
            presenter.stop_spinner();
            match controller.stop_recording().await {
                Ok(()) => {
                    if let Some(recording) = controller.last_recording() {
                        if recording.is_empty() {
                            presenter.warn("No audio was captured");
                        }
                        presenter.success(&format!(
                            "Recording complete ({}, {})",
                            recording.human_readable_size(),
                            recording.mime_type()
                        ));
                    }
                }
                Err(e @ StopError::Capture(_)) => {
                    presenter.error(&format!("{}. Type 'c' to reset", e))
                }
                Err(e) => presenter.error(&e.to_string()),
            }
        }
        UserAction::Cancel => controller.cancel_recording(),
        UserAction::Download => match controller.download_link() {
            Some(link) => match sink.save(&link).await {
                Ok(path) => presenter.success(&format!("Saved {}", path.display())),
                Err(e) => presenter.error(&e.to_string()),
            },
            None => presenter.warn("Nothing to download yet"),
        },
        UserAction::DismissOverlay => controller.dismiss_overlay(),
        UserAction::Help => presenter.help(),
        UserAction::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Forward stdin lines from a plain thread.
///
/// A blocked read must not hold up runtime shutdown, so this stays off
/// tokio's blocking pool.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "could not start input reader");
    }
    rx
}

/// Config layer from the environment
fn env_config(output_dir: Option<String>) -> AppConfig {
    AppConfig {
        output_dir: output_dir.filter(|s| !s.trim().is_empty()),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config(env::var(OUTPUT_DIR_ENV).ok()))
        .merge(cli_config)
}
