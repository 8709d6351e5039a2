use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn budge_cmd() -> Command {
    Command::cargo_bin("budge").expect("Failed to find budge binary")
}

/// Writes frames named 000.png, 001.png, ... with the given gray levels.
fn frame_dir(levels: &[u8]) -> Result<TempDir, Box<dyn Error>> {
    let dir = tempdir()?;
    for (i, level) in levels.iter().enumerate() {
        let path = dir.path().join(format!("{i:03}.png"));
        RgbImage::from_pixel(64, 48, Rgb([*level; 3])).save(path)?;
    }
    Ok(dir)
}

/// A config with no startup pauses so the tests run quickly.
fn quick_config(dir: &Path) -> Result<std::path::PathBuf, Box<dyn Error>> {
    let path = dir.join("budge.json");
    std::fs::write(
        &path,
        r#"{ "camera_warmup_ms": 0, "lighting_settle_ms": 0, "fps": 1000 }"#,
    )?;
    Ok(path)
}

#[cfg(unix)]
#[test]
fn relocation_sequence_exits_zero() -> Result<(), Box<dyn Error>> {
    let mut levels = vec![0u8];
    levels.extend([255; 4]);
    levels.extend([0; 4]);
    let frames = frame_dir(&levels)?;
    let config_dir = tempdir()?;
    let config = quick_config(config_dir.path())?;

    budge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--frames")
        .arg(frames.path())
        .arg("--no-dim")
        .arg("--alert-player")
        .arg("true")
        .assert()
        .success()
        .stdout(contains("Device moved"));

    Ok(())
}

#[test]
fn still_sequence_runs_out_and_fails() -> Result<(), Box<dyn Error>> {
    let frames = frame_dir(&[90; 12])?;
    let config_dir = tempdir()?;
    let config = quick_config(config_dir.path())?;

    budge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--frames")
        .arg(frames.path())
        .arg("--no-dim")
        .arg("--alert-player")
        .arg("budge-test-no-such-player")
        .assert()
        .code(1)
        .stdout(contains("image sequence exhausted"));

    Ok(())
}

#[test]
fn empty_frame_directory_fails_on_first_frame() -> Result<(), Box<dyn Error>> {
    let frames = tempdir()?;
    let config_dir = tempdir()?;
    let config = quick_config(config_dir.path())?;

    budge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--frames")
        .arg(frames.path())
        .arg("--no-dim")
        .assert()
        .code(1)
        .stdout(contains("Couldn't grab first frame"));

    Ok(())
}

#[test]
fn invalid_sensitivity_is_rejected() {
    budge_cmd()
        .arg("--sensitivity")
        .arg("250")
        .assert()
        .failure()
        .stderr(contains("250"));
}

#[test]
fn malformed_config_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("budge.json");
    std::fs::write(&path, "{ not json")?;

    budge_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(contains("loading config"));

    Ok(())
}
