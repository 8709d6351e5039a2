//! budge: watches the camera with the screen dimmed and sounds an alert once
//! the device has been physically moved.
//!
//! Exit status is 0 after the alert, 1 when the camera fails or setup goes
//! wrong, and 130 when interrupted with Ctrl-C.

use anyhow::Context;
use budge_vision::{
    AlertEmitter, DisplayControl, FrameSource, NoopDisplay, Sentinel, SentinelConfig,
    SentinelOutcome, SentinelTiming,
};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

mod alert;
mod cli;
mod display;
mod logging;
#[cfg(feature = "camera")]
mod preview;
mod sources;

use cli::Cli;

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("budge: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.logging);

    match run(&cli, &config).await {
        Ok(SentinelOutcome::Alerted { events, frames }) => {
            info!(events, frames, "Alert raised, exiting");
            ExitCode::SUCCESS
        }
        Ok(SentinelOutcome::Interrupted { frames }) => {
            info!(frames, "Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &SentinelConfig) -> anyhow::Result<SentinelOutcome> {
    let thresholds = config.thresholds()?;
    let source = open_source(cli, config).context("opening frame source")?;

    let display: Box<dyn DisplayControl> = if config.dim_display {
        Box::new(display::BrightnessControl::new())
    } else {
        Box::new(NoopDisplay)
    };
    let alert: Box<dyn AlertEmitter> = Box::new(alert::SoundAlert::new(
        config.alert_player.clone(),
        &config.alert_sound,
    ));

    let mut sentinel = Sentinel::new(
        source,
        display,
        alert,
        thresholds,
        SentinelTiming::from_config(config),
    );

    #[cfg(feature = "camera")]
    if cli.preview {
        let preview = preview::MaskPreview::new().context("opening preview window")?;
        sentinel = sentinel.with_observer(Box::new(preview));
    }

    Ok(sentinel.run_until(shutdown_signal()).await?)
}

fn open_source(cli: &Cli, config: &SentinelConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    if let Some(dir) = &cli.frames {
        let source = sources::ImageSequenceSource::open(dir)?;
        info!(dir = %dir.display(), frames = source.remaining(), "Reading image sequence");
        return Ok(Box::new(source));
    }
    open_capture(cli, config)
}

#[cfg(feature = "camera")]
fn open_capture(cli: &Cli, config: &SentinelConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    use sources::camera::CameraSource;

    let source = match &cli.video {
        Some(path) => CameraSource::open_file(path)?,
        None => CameraSource::open(config.camera_index)?,
    };
    Ok(Box::new(source))
}

#[cfg(not(feature = "camera"))]
fn open_capture(_cli: &Cli, config: &SentinelConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    anyhow::bail!(
        "no capture backend for camera {}: rebuild with `--features camera` or pass --frames <dir>",
        config.camera_index
    )
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
