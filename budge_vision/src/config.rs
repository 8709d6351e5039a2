//! Sentinel configuration.

use crate::core_modules::sensitivity::{MAX_SENSITIVITY, Sensitivity, Thresholds};
use crate::error::{BudgeError, BudgeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the sentinel needs to know before it starts watching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// 0..=100, higher is more sensitive.
    pub sensitivity: Sensitivity,

    /// Target loop rate in frames per second.
    pub fps: u32,

    /// Index of the capture device.
    pub camera_index: i32,

    /// Pause after opening the camera, before dimming the display.
    pub camera_warmup_ms: u64,

    /// Pause after dimming, before grabbing the background frame.
    pub lighting_settle_ms: u64,

    /// Sound file played when the device has been moved.
    pub alert_sound: PathBuf,

    /// Program that plays `alert_sound`.
    pub alert_player: String,

    /// Whether to turn the screen brightness down while watching.
    pub dim_display: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "budge_vision=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            sensitivity: 55,
            fps: 15,
            camera_index: 0,
            camera_warmup_ms: 500,
            lighting_settle_ms: 500,
            alert_sound: PathBuf::from("alert.wav"),
            alert_player: "play".to_string(),
            dim_display: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SentinelConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> BudgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BudgeResult<()> {
        if self.sensitivity > MAX_SENSITIVITY {
            return Err(BudgeError::config(format!(
                "sensitivity must be within 0..={MAX_SENSITIVITY}, got {}",
                self.sensitivity
            )));
        }
        if self.fps == 0 {
            return Err(BudgeError::config("fps must be greater than zero"));
        }
        Ok(())
    }

    /// Thresholds derived from the configured sensitivity.
    pub fn thresholds(&self) -> BudgeResult<Thresholds> {
        Thresholds::from_sensitivity(self.sensitivity)
    }

    /// Delay between loop iterations, `1 / fps`.
    pub fn frame_wait(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    pub fn camera_warmup(&self) -> Duration {
        Duration::from_millis(self.camera_warmup_ms)
    }

    pub fn lighting_settle(&self) -> Duration {
        Duration::from_millis(self.lighting_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = SentinelConfig::default();
        assert_eq!(config.sensitivity, 55);
        assert_eq!(config.fps, 15);
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds().unwrap().consecutive_threshold, 4);
    }

    #[test]
    fn frame_wait_is_inverse_fps() {
        let config = SentinelConfig {
            fps: 20,
            ..SentinelConfig::default()
        };
        assert_eq!(config.frame_wait(), Duration::from_millis(50));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let config = SentinelConfig {
            fps: 0,
            ..SentinelConfig::default()
        };
        assert!(matches!(config.validate(), Err(BudgeError::Config { .. })));
    }

    #[test]
    fn oversized_sensitivity_is_rejected() {
        let config = SentinelConfig {
            sensitivity: 140,
            ..SentinelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sensitivity": 80, "logging": {{ "json": true }} }}"#).unwrap();

        let config = SentinelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sensitivity, 80);
        assert_eq!(config.fps, 15);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sensitivity = 80").unwrap();
        assert!(matches!(
            SentinelConfig::from_file(file.path()),
            Err(BudgeError::Json(_))
        ));
    }
}
