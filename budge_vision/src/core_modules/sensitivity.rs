// THEORY:
// Every detection threshold in the engine hangs off a single knob, the
// sensitivity (0..=100, higher reacts sooner). The `Thresholds` struct is the
// one place that turns that knob into numbers, once, at startup. Nothing
// downstream ever reads the raw sensitivity again.
//
// 1.  `change_threshold` is the percentage a region score must strictly exceed
//     before the classifier counts it. It is the inverse of sensitivity.
// 2.  `consecutive_threshold` is how many motion-positive frames in a row make
//     up one confirmed event. Low sensitivity asks for longer streaks.
// 3.  `event_threshold` is how many confirmed events raise the alert.
//
// The two counting thresholds are clamped to a floor of 2 so that a single
// noisy frame, or a single bump that resettles, can never raise the alert.

use crate::error::{BudgeError, BudgeResult};

pub type Sensitivity = u8;
pub type Percent = u8;

pub const MAX_SENSITIVITY: Sensitivity = 100;
const MIN_COUNT_THRESHOLD: u32 = 2;

/// The immutable set of thresholds derived from a sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// A region score must be strictly greater than this to count as changed.
    pub change_threshold: Percent,
    /// Consecutive motion-positive frames needed to confirm one event.
    pub consecutive_threshold: u32,
    /// Confirmed events needed to raise the alert.
    pub event_threshold: u32,
}

impl Thresholds {
    /// Derives the thresholds for a sensitivity in `0..=100`.
    pub fn from_sensitivity(sensitivity: Sensitivity) -> BudgeResult<Self> {
        if sensitivity > MAX_SENSITIVITY {
            return Err(BudgeError::config(format!(
                "sensitivity must be within 0..={MAX_SENSITIVITY}, got {sensitivity}"
            )));
        }

        let inverse = u32::from(MAX_SENSITIVITY - sensitivity);
        let steps = inverse.div_ceil(10).saturating_sub(1);
        let consecutive_threshold = steps.max(MIN_COUNT_THRESHOLD);
        let event_threshold = (consecutive_threshold / 2).max(MIN_COUNT_THRESHOLD);

        Ok(Self {
            change_threshold: MAX_SENSITIVITY - sensitivity,
            consecutive_threshold,
            event_threshold,
        })
    }
}
