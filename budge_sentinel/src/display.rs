//! Screen brightness control through the `brightness` command line tool.

use budge_vision::{BudgeError, BudgeResult, DisplayControl};
use std::process::Command;
use tracing::{debug, info};

const BRIGHTNESS_PROGRAM: &str = "brightness";
const FALLBACK_LEVEL: f32 = 1.0;

/// Saves the current backlight level, turns it to zero, and puts it back later.
#[derive(Debug)]
pub struct BrightnessControl {
    program: String,
    saved_level: f32,
}

impl BrightnessControl {
    pub fn new() -> Self {
        Self::with_program(BRIGHTNESS_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            saved_level: FALLBACK_LEVEL,
        }
    }

    fn set_level(&self, level: f32) -> BudgeResult<()> {
        let status = Command::new(&self.program)
            .arg(level.to_string())
            .status()
            .map_err(|e| BudgeError::display(format!("running {}: {e}", self.program)))?;
        if !status.success() {
            return Err(BudgeError::display(format!(
                "{} {level} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

impl Default for BrightnessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayControl for BrightnessControl {
    fn suppress(&mut self) -> BudgeResult<()> {
        let output = Command::new(&self.program)
            .arg("-l")
            .output()
            .map_err(|e| BudgeError::display(format!("running {} -l: {e}", self.program)))?;
        if !output.status.success() {
            return Err(BudgeError::display(format!(
                "{} -l exited with {}",
                self.program, output.status
            )));
        }

        self.saved_level = parse_brightness_listing(&String::from_utf8_lossy(&output.stdout))?;
        debug!(level = self.saved_level, "Saved display brightness");
        self.set_level(0.0)?;
        info!("Display dimmed");
        Ok(())
    }

    fn restore(&mut self) -> BudgeResult<()> {
        self.set_level(self.saved_level)
    }
}

/// Pulls the level out of `brightness -l` output.
///
/// The level is the fourth field of the second line, e.g.
/// `display 0: brightness 0.750000`.
pub fn parse_brightness_listing(listing: &str) -> BudgeResult<f32> {
    let line = listing
        .lines()
        .nth(1)
        .ok_or_else(|| BudgeError::display("brightness listing has no level line"))?;
    let field = line
        .split(' ')
        .nth(3)
        .ok_or_else(|| BudgeError::display(format!("unexpected brightness line: {line:?}")))?;
    field
        .trim()
        .parse::<f32>()
        .map_err(|e| BudgeError::display(format!("unparseable brightness {field:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_level_line() {
        let listing = "display 0: main, active, awake, online, built-in, ID 0x4280a80\n\
                       display 0: brightness 0.750000\n";
        assert!((parse_brightness_listing(listing).unwrap() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn missing_line_is_an_error() {
        let err = parse_brightness_listing("display 0: main\n").unwrap_err();
        assert!(matches!(err, BudgeError::Display { .. }));
    }

    #[test]
    fn garbage_level_is_an_error() {
        assert!(parse_brightness_listing("x\ndisplay 0: brightness high\n").is_err());
        assert!(parse_brightness_listing("x\ndisplay 0:\n").is_err());
    }

    #[test]
    fn missing_program_fails_to_suppress() {
        let mut control = BrightnessControl::with_program("budge-test-no-such-brightness-tool");
        assert!(control.suppress().is_err());
        assert!(control.restore().is_err());
    }
}
