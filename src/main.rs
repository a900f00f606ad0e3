//! ClipRecorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use clip_recorder::cli::{
    app::{load_merged_config, run_interactive, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    RecorderOptions,
};
use clip_recorder::domain::config::AppConfig;
use clip_recorder::domain::recording::MaxRecordingHours;
use clip_recorder::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level())
        .init();

    let presenter = Presenter::new();

    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Validate before touching any device
    let max_hours = match cli.max_hours.as_deref().map(str::parse::<MaxRecordingHours>) {
        Some(Ok(hours)) => Some(hours.get()),
        Some(Err(e)) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
        None => None,
    };

    let cli_config = AppConfig {
        max_recording_hours: max_hours,
        download_filename: cli.filename.clone(),
        output_dir: cli.output_dir.clone(),
        playback: if cli.no_playback { Some(false) } else { None },
    };

    let config = load_merged_config(cli_config).await;

    let options = RecorderOptions {
        max_recording_hours: config.max_recording_hours_or_default(),
        download_filename: config.download_filename_or_default().to_string(),
        output_dir: config.output_dir_or_default(),
        playback: config.playback_or_default(),
    };

    run_interactive(options).await
}
