//! Live window showing the dilated change mask of every cycle.

use budge_vision::{BudgeError, BudgeResult, CycleObserver, CycleReport};
use opencv::{
    core::{CV_8UC1, Mat, Scalar},
    highgui,
    prelude::*,
};
use tracing::warn;

const WINDOW_NAME: &str = "dilated";
const WAIT_KEY_MS: i32 = 3;

fn display_error(e: opencv::Error) -> BudgeError {
    BudgeError::display(e.to_string())
}

/// An opencv highgui window, destroyed when dropped.
pub struct MaskPreview;

impl MaskPreview {
    pub fn new() -> BudgeResult<Self> {
        highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE).map_err(display_error)?;
        Ok(Self)
    }
}

impl CycleObserver for MaskPreview {
    fn observe(&mut self, report: &CycleReport) -> BudgeResult<()> {
        let (width, height) = report.mask.dimensions();
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC1,
            Scalar::all(0.0),
        )
        .map_err(display_error)?;
        mat.data_bytes_mut()
            .map_err(display_error)?
            .copy_from_slice(report.mask.as_raw());

        highgui::imshow(WINDOW_NAME, &mat).map_err(display_error)?;
        highgui::wait_key(WAIT_KEY_MS).map_err(display_error)?;
        Ok(())
    }
}

impl Drop for MaskPreview {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(WINDOW_NAME) {
            warn!(error = %e, "Failed to close preview window");
        }
    }
}
