// THEORY:
// The `pipeline` module is the top-level API of the engine. It strings the core
// modules together for a single frame: normalize, score against the background,
// classify, and hand the decision to the tracker. Its output is a `CycleReport`
// describing what happened, which the sentinel loop logs and acts on.
//
// The pipeline never touches a camera, a screen or a speaker. Callers feed it
// frames and read reports, which keeps it fully drivable from tests.

use crate::core_modules::change_scorer;
use crate::core_modules::frame::{self, Frame, RawFrame};
use crate::core_modules::motion_classifier::classify;
use crate::core_modules::motion_tracker::{MotionTracker, TrackerPhase};
use crate::core_modules::sensitivity::Thresholds;
use crate::error::BudgeResult;
use image::GrayImage;

// Re-export key data structures for the public API.
pub use crate::core_modules::change_scorer::RegionScore;
pub use crate::core_modules::motion_tracker::{TrackerState, Transition};

/// The outcome of one processed frame.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub score: RegionScore,
    /// Whether this single frame was classified as motion.
    pub moved: bool,
    pub transition: Transition,
    /// Streak length after this frame.
    pub consecutive_motion_count: u32,
    /// Events confirmed so far, including any confirmed by this frame.
    pub confirmed_event_count: u32,
    /// The dilated changed-pixel mask behind `score`.
    pub mask: GrayImage,
}

impl CycleReport {
    pub fn is_alert(&self) -> bool {
        matches!(self.transition, Transition::Alert { .. })
    }

    /// One-line human readable summary of the frame.
    pub fn summary(&self) -> String {
        format!(
            "t={:03} b={:03} l={:03} r={:03} tot={:03} {} {} {}",
            self.score.top,
            self.score.bottom,
            self.score.left,
            self.score.right,
            self.score.total,
            if self.moved { "!!!" } else { "" },
            self.consecutive_motion_count,
            self.confirmed_event_count,
        )
    }
}

/// Runs frames through normalization, scoring, classification and tracking.
#[derive(Debug)]
pub struct MotionPipeline {
    tracker: MotionTracker,
}

impl MotionPipeline {
    /// Starts a pipeline with `background` as the first reference frame.
    pub fn new(thresholds: Thresholds, background: &RawFrame) -> Self {
        Self::with_background(thresholds, frame::normalize(background))
    }

    /// Starts a pipeline from an already normalized background.
    pub fn with_background(thresholds: Thresholds, background: Frame) -> Self {
        Self {
            tracker: MotionTracker::new(thresholds, background),
        }
    }

    /// Normalizes and processes one raw frame.
    pub fn process_frame(&mut self, raw: &RawFrame) -> BudgeResult<CycleReport> {
        self.process_normalized(frame::normalize(raw))
    }

    /// Processes a frame that has already gone through normalization.
    pub fn process_normalized(&mut self, current: Frame) -> BudgeResult<CycleReport> {
        // Stage 1: Change scoring against the current background.
        let mask = change_scorer::change_mask(self.tracker.background(), &current)?;
        let score = change_scorer::score_mask(&mask);

        // Stage 2: Single-frame decision.
        let moved = classify(&score, self.tracker.thresholds().change_threshold);

        // Stage 3: Debounce, rebase and count.
        let transition = self.tracker.observe(moved, current);
        let state = self.tracker.state();

        Ok(CycleReport {
            score,
            moved,
            transition,
            consecutive_motion_count: state.consecutive_motion_count(),
            confirmed_event_count: state.confirmed_event_count(),
            mask,
        })
    }

    /// Records that the frame source gave out.
    pub fn fail(&mut self) {
        self.tracker.fail();
    }

    pub fn phase(&self) -> TrackerPhase {
        self.tracker.phase()
    }
}
