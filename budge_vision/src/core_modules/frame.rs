// THEORY:
// The `frame` module is the bottom of the engine. It turns whatever the camera
// hands us into a `Frame`: a fixed-width, single-channel, heavily smoothed
// grayscale image. Two frames produced here can be differenced pixel for pixel
// without worrying about resolution, color balance, or sensor grain.
//
// Key architectural principles:
// 1.  **Fixed Geometry**: Every frame is resized to `NORMALIZED_WIDTH` with the
//     height following the source aspect ratio. The background and the current
//     frame therefore share dimensions as long as the camera does not change
//     resolution mid-run.
// 2.  **Luminance Only**: Color is collapsed with the Rec. 601 luma weights.
//     Movement shows up as brightness structure shifting, color adds nothing.
// 3.  **Strong Smoothing**: A 21x21 Gaussian (sigma 3.5) wipes out
//     high-frequency sensor noise while leaving real edges in place.
// 4.  **Immutability**: A `Frame` exposes read access only. The tracker replaces
//     its background with a new `Frame`, it never edits one.

use image::{GrayImage, Luma, RgbImage, imageops::FilterType};

/// The raw, three-channel image delivered by a frame source.
pub type RawFrame = RgbImage;

/// Width, in pixels, of every normalized frame.
pub const NORMALIZED_WIDTH: u32 = 500;
/// Reference Gaussian kernel size (odd, square).
pub const BLUR_KERNEL_SIZE: u32 = 21;

/// A normalized grayscale frame, ready for differencing.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: GrayImage,
}

impl Frame {
    /// Wraps an already-normalized grayscale image.
    ///
    /// Only frames built by [`normalize`] are guaranteed to share dimensions,
    /// this constructor exists for synthetic frames in tests and replays.
    pub fn from_luma(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_luma(&self) -> &GrayImage {
        &self.image
    }
}

/// Resizes, desaturates and blurs a raw frame.
///
/// The caller must hand over a non-empty image, frame sources reject empty
/// reads before they get here.
pub fn normalize(raw: &RawFrame) -> Frame {
    let resized = resize_to_width(raw, NORMALIZED_WIDTH);
    let gray = to_luma(&resized);
    let blurred = imageproc::filter::gaussian_blur_f32(&gray, kernel_sigma(BLUR_KERNEL_SIZE));
    Frame::from_luma(blurred)
}

fn resize_to_width(raw: &RawFrame, width: u32) -> RgbImage {
    let (w, h) = raw.dimensions();
    if w == width {
        return raw.clone();
    }
    let height = ((u64::from(h) * u64::from(width)) / u64::from(w.max(1))).max(1) as u32;
    image::imageops::resize(raw, width, height, FilterType::Triangle)
}

/// Rec. 601 luma, rounded to the nearest integer.
fn to_luma(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = 0.299_f32 * f32::from(r) + 0.587_f32 * f32::from(g) + 0.114_f32 * f32::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Sigma that a square Gaussian kernel of size `k` implies when no sigma is given.
fn kernel_sigma(k: u32) -> f32 {
    0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
