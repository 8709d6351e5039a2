//! Command-line arguments and how they fold into the sentinel configuration.

use anyhow::Context;
use budge_vision::SentinelConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "budge",
    about = "Dims the screen, watches the camera, and sounds an alert once the device is moved",
    version
)]
pub struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Detection sensitivity, 0-100 (higher reacts sooner)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub sensitivity: Option<u8>,

    /// Target frames per second
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Capture device index
    #[arg(long)]
    pub camera: Option<i32>,

    /// Read frames from a video file instead of a camera
    #[cfg(feature = "camera")]
    #[arg(long, conflicts_with = "frames")]
    pub video: Option<PathBuf>,

    /// Read frames from a directory of images, in file name order
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Sound file played when the device has been moved
    #[arg(long)]
    pub alert_sound: Option<PathBuf>,

    /// Program used to play the alert sound
    #[arg(long)]
    pub alert_player: Option<String>,

    /// Leave the screen brightness alone
    #[arg(long)]
    pub no_dim: bool,

    /// Show the change mask in a window while watching
    #[cfg(feature = "camera")]
    #[arg(long)]
    pub preview: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Loads the config file, if any, and applies flag overrides on top.
    pub fn resolve_config(&self) -> anyhow::Result<SentinelConfig> {
        let mut config = match &self.config {
            Some(path) => SentinelConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => SentinelConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut SentinelConfig) {
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(camera) = self.camera {
            config.camera_index = camera;
        }
        if let Some(sound) = &self.alert_sound {
            config.alert_sound = sound.clone();
        }
        if let Some(player) = &self.alert_player {
            config.alert_player = player.clone();
        }
        if self.no_dim {
            config.dim_display = false;
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}
