// THEORY:
// The `change_scorer` measures how far the current frame has drifted from the
// background. It produces a binary "changed" mask and reduces it to five
// percentages: the whole frame plus each of the four one-pixel border strips.
//
// Borders are scored on their own because relocating the device shifts the
// whole field of view, which lights up the frame boundary. A hand waved in
// front of the lens mostly changes the middle.
//
// The per-pixel cut-off (`PIXEL_DELTA_THRESHOLD`) is fixed and independent of
// sensitivity. It only separates real change from compression and sensor
// jitter; sensitivity is applied later by the classifier.

use crate::core_modules::frame::Frame;
use crate::core_modules::sensitivity::Percent;
use crate::error::{BudgeError, BudgeResult};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

/// Absolute intensity difference (0..=255) above which a pixel counts as changed.
pub const PIXEL_DELTA_THRESHOLD: u8 = 25;
/// Number of 3x3 dilation passes applied to the changed mask.
pub const DILATE_ITERATIONS: u8 = 2;

const CHANGED: u8 = 255;

/// Change percentages for one frame against the background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionScore {
    pub top: Percent,
    pub bottom: Percent,
    pub left: Percent,
    pub right: Percent,
    pub total: Percent,
}

impl RegionScore {
    /// The four border strips in `top, bottom, left, right` order.
    pub fn edges(&self) -> [Percent; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Builds the dilated changed-pixel mask between `background` and `current`.
///
/// Changed pixels are 255, everything else 0.
pub fn change_mask(background: &Frame, current: &Frame) -> BudgeResult<GrayImage> {
    if background.dimensions() != current.dimensions() {
        return Err(BudgeError::FrameMismatch {
            expected: background.dimensions(),
            actual: current.dimensions(),
        });
    }

    let (width, height) = background.dimensions();
    let bg = background.as_luma();
    let cur = current.as_luma();
    let thresholded = GrayImage::from_fn(width, height, |x, y| {
        let delta = bg.get_pixel(x, y).0[0].abs_diff(cur.get_pixel(x, y).0[0]);
        Luma([if delta > PIXEL_DELTA_THRESHOLD { CHANGED } else { 0 }])
    });

    // Repeated 3x3 square dilation is the same as one pass with an L-inf radius.
    Ok(imageproc::morphology::dilate(
        &thresholded,
        Norm::LInf,
        DILATE_ITERATIONS,
    ))
}

/// Scores `current` against `background`.
pub fn score(background: &Frame, current: &Frame) -> BudgeResult<RegionScore> {
    let mask = change_mask(background, current)?;
    Ok(score_mask(&mask))
}

/// Reduces a changed mask to its region percentages.
pub fn score_mask(mask: &GrayImage) -> RegionScore {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return RegionScore::default();
    }

    let changed = |x: u32, y: u32| u64::from(mask.get_pixel(x, y).0[0] != 0);
    let row = |y: u32| (0..width).map(|x| changed(x, y)).sum::<u64>();
    let column = |x: u32| (0..height).map(|y| changed(x, y)).sum::<u64>();
    let all = mask.pixels().filter(|p| p.0[0] != 0).count() as u64;

    RegionScore {
        top: percent(row(0), u64::from(width)),
        bottom: percent(row(height - 1), u64::from(width)),
        left: percent(column(0), u64::from(height)),
        right: percent(column(width - 1), u64::from(height)),
        total: percent(all, u64::from(width) * u64::from(height)),
    }
}

/// Truncating percentage, 0 for an empty region.
fn percent(changed: u64, total: u64) -> Percent {
    if total == 0 {
        return 0;
    }
    (changed * 100 / total) as Percent
}
