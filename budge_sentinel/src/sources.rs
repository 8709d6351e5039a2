//! Frame sources: a directory of still images, and with the `camera` feature
//! an opencv capture device or video file.

use budge_vision::core_modules::frame::RawFrame;
use budge_vision::{BudgeError, BudgeResult, FrameSource};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Replays a directory of images in file name order, then reports exhaustion.
#[derive(Debug)]
pub struct ImageSequenceSource {
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> BudgeResult<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        paths.sort();
        debug!(dir = %dir.display(), count = paths.len(), "Opened image sequence");
        Ok(Self {
            pending: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> BudgeResult<RawFrame> {
        let path = self
            .pending
            .pop_front()
            .ok_or_else(|| BudgeError::frame_acquisition("image sequence exhausted"))?;
        let frame = image::open(&path)
            .map_err(|e| BudgeError::frame_acquisition(format!("{}: {e}", path.display())))?
            .to_rgb8();
        if frame.width() == 0 || frame.height() == 0 {
            return Err(BudgeError::frame_acquisition(format!(
                "{}: empty image",
                path.display()
            )));
        }
        Ok(frame)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(feature = "camera")]
pub mod camera {
    use budge_vision::core_modules::frame::RawFrame;
    use budge_vision::{BudgeError, BudgeResult, FrameSource};
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{self, VideoCapture},
    };
    use std::path::Path;
    use tracing::{debug, warn};

    fn acquisition(e: opencv::Error) -> BudgeError {
        BudgeError::frame_acquisition(e.to_string())
    }

    /// An opencv capture handle, released when dropped.
    pub struct CameraSource {
        capture: VideoCapture,
        frame: Mat,
    }

    impl CameraSource {
        /// Opens the capture device at `index`.
        pub fn open(index: i32) -> BudgeResult<Self> {
            let capture = VideoCapture::new(index, videoio::CAP_ANY).map_err(acquisition)?;
            Self::from_capture(capture, &format!("camera {index}"))
        }

        /// Opens a video file and replays it as if it were a camera.
        pub fn open_file(path: &Path) -> BudgeResult<Self> {
            let name = path.to_string_lossy();
            let capture = VideoCapture::from_file(&name, videoio::CAP_ANY).map_err(acquisition)?;
            Self::from_capture(capture, &name)
        }

        fn from_capture(capture: VideoCapture, name: &str) -> BudgeResult<Self> {
            if !capture.is_opened().map_err(acquisition)? {
                return Err(BudgeError::frame_acquisition(format!("could not open {name}")));
            }
            debug!(source = name, "Capture opened");
            Ok(Self {
                capture,
                frame: Mat::default(),
            })
        }
    }

    impl FrameSource for CameraSource {
        fn read_frame(&mut self) -> BudgeResult<RawFrame> {
            let grabbed = self.capture.read(&mut self.frame).map_err(acquisition)?;
            if !grabbed || self.frame.empty() {
                return Err(BudgeError::frame_acquisition("capture returned no frame"));
            }

            // Convert the OpenCV Mat (BGR) to an RGB buffer for the pipeline.
            let mut rgb = Mat::default();
            imgproc::cvt_color(&self.frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
                .map_err(acquisition)?;
            let width = rgb.cols() as u32;
            let height = rgb.rows() as u32;
            let bytes = rgb.data_bytes().map_err(acquisition)?.to_vec();

            RawFrame::from_raw(width, height, bytes)
                .ok_or_else(|| BudgeError::frame_acquisition("frame buffer size mismatch"))
        }
    }

    impl Drop for CameraSource {
        fn drop(&mut self) {
            match self.capture.release() {
                Ok(()) => debug!("Capture released"),
                Err(e) => warn!(error = %e, "Failed to release capture"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn replays_images_in_name_order_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 6, Rgb([0, 0, 0]))
            .save(dir.path().join("002.png"))
            .unwrap();
        RgbImage::from_pixel(8, 6, Rgb([255, 255, 255]))
            .save(dir.path().join("001.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        assert_eq!(source.remaining(), 2);

        let first = source.read_frame().unwrap();
        assert_eq!(first.get_pixel(0, 0), &Rgb([255, 255, 255]));
        let second = source.read_frame().unwrap();
        assert_eq!(second.get_pixel(0, 0), &Rgb([0, 0, 0]));

        let err = source.read_frame().unwrap_err();
        assert!(err.is_frame_acquisition());
    }

    #[test]
    fn undecodable_image_is_an_acquisition_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        assert!(source.read_frame().unwrap_err().is_frame_acquisition());
    }

    #[test]
    fn missing_directory_fails_to_open() {
        assert!(ImageSequenceSource::open(Path::new("/nonexistent/budge-frames")).is_err());
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_image(Path::new("a/frame.PNG")));
        assert!(is_image(Path::new("frame.jpeg")));
        assert!(!is_image(Path::new("frame.wav")));
        assert!(!is_image(Path::new("frame")));
    }
}
