//! Audible alert played through an external sound player.

use budge_vision::{AlertEmitter, BudgeError, BudgeResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

/// Plays a sound file with an external player (SoX `play` by default) and
/// waits for it to finish.
#[derive(Debug, Clone)]
pub struct SoundAlert {
    player: String,
    sound: PathBuf,
}

impl SoundAlert {
    pub fn new(player: impl Into<String>, sound: &Path) -> Self {
        Self {
            player: player.into(),
            sound: sound.to_path_buf(),
        }
    }
}

impl AlertEmitter for SoundAlert {
    fn emit(&mut self) -> BudgeResult<()> {
        info!(sound = %self.sound.display(), "Playing alert");
        let status = Command::new(&self.player)
            .arg(&self.sound)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| BudgeError::alert(format!("running {}: {e}", self.player)))?;
        if !status.success() {
            return Err(BudgeError::alert(format!(
                "{} {} exited with {status}",
                self.player,
                self.sound.display()
            )));
        }
        Ok(())
    }
}
