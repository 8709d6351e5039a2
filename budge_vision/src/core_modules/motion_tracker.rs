// THEORY:
// The `motion_tracker` carries all of the engine's memory. Single-frame
// classifications are noisy; the tracker debounces them into "events" and
// decides when enough events have happened to say the device was moved.
//
// Key architectural principles:
// 1.  **Debouncing**: A frame classified as moved extends the current streak, any
//     other frame breaks it. Only a streak of `consecutive_threshold` frames
//     confirms an event.
// 2.  **Rebasing**: Confirming an event replaces the background with the frame
//     that confirmed it. Later frames are measured against the new position, so
//     one bump that resettles yields one event and then silence. A device that
//     keeps moving has to build a fresh streak against the new background for
//     every further event.
// 3.  **Single Comparison Baseline**: Only the most recent background is kept.
//     There is no multi-frame history, so fast oscillation that returns to the
//     old view before a streak completes is not counted.
// 4.  **Terminal States**: `Alerting` and `Failed` are sinks. Once reached, the
//     counters stop moving and every observation reports `Halted`.

use crate::core_modules::frame::Frame;
use crate::core_modules::sensitivity::Thresholds;

/// Lifecycle of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Background captured, nothing classified yet.
    Idle,
    /// Classifications are flowing in and being counted.
    Accumulating,
    /// The event threshold was reached.
    Alerting,
    /// The frame source gave out.
    Failed,
}

impl TrackerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Alerting | Self::Failed)
    }
}

/// What a single observation did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Counters updated, no event.
    Counted,
    /// A streak completed: one more event and the background was rebased.
    EventConfirmed { events: u32 },
    /// The event that reached the alert threshold. The background was rebased too.
    Alert { events: u32 },
    /// The tracker was already terminal and ignored the observation.
    Halted,
}

/// The mutable state owned by the tracker.
#[derive(Debug, Clone)]
pub struct TrackerState {
    background: Frame,
    consecutive_motion_count: u32,
    confirmed_event_count: u32,
}

impl TrackerState {
    fn new(background: Frame) -> Self {
        Self {
            background,
            consecutive_motion_count: 0,
            confirmed_event_count: 0,
        }
    }

    /// The frame every new frame is compared against.
    pub fn background(&self) -> &Frame {
        &self.background
    }

    pub fn consecutive_motion_count(&self) -> u32 {
        self.consecutive_motion_count
    }

    pub fn confirmed_event_count(&self) -> u32 {
        self.confirmed_event_count
    }
}

/// Debounces per-frame motion decisions into confirmed events.
#[derive(Debug, Clone)]
pub struct MotionTracker {
    thresholds: Thresholds,
    state: TrackerState,
    phase: TrackerPhase,
}

impl MotionTracker {
    /// Starts tracking with the first captured frame as background.
    pub fn new(thresholds: Thresholds, background: Frame) -> Self {
        Self {
            thresholds,
            state: TrackerState::new(background),
            phase: TrackerPhase::Idle,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn background(&self) -> &Frame {
        self.state.background()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Feeds one classification along with the frame it was computed from.
    ///
    /// `current` becomes the new background when this observation confirms an
    /// event, otherwise it is dropped.
    pub fn observe(&mut self, moved: bool, current: Frame) -> Transition {
        if self.phase.is_terminal() {
            return Transition::Halted;
        }
        self.phase = TrackerPhase::Accumulating;

        let state = &mut self.state;
        if moved {
            state.consecutive_motion_count += 1;
        } else {
            state.consecutive_motion_count = 0;
        }

        if state.consecutive_motion_count < self.thresholds.consecutive_threshold {
            return Transition::Counted;
        }

        state.confirmed_event_count += 1;
        state.consecutive_motion_count = 0;
        state.background = current;
        let events = state.confirmed_event_count;

        if events >= self.thresholds.event_threshold {
            self.phase = TrackerPhase::Alerting;
            Transition::Alert { events }
        } else {
            Transition::EventConfirmed { events }
        }
    }

    /// Marks the tracker as failed after the frame source gave out.
    pub fn fail(&mut self) {
        self.phase = TrackerPhase::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn frame(value: u8) -> Frame {
        Frame::from_luma(GrayImage::from_pixel(8, 6, Luma([value])))
    }

    fn thresholds(consecutive: u32, events: u32) -> Thresholds {
        Thresholds {
            change_threshold: 45,
            consecutive_threshold: consecutive,
            event_threshold: events,
        }
    }

    #[test]
    fn starts_idle_with_empty_counters() {
        let tracker = MotionTracker::new(thresholds(4, 2), frame(0));
        assert_eq!(tracker.phase(), TrackerPhase::Idle);
        assert_eq!(tracker.state().consecutive_motion_count(), 0);
        assert_eq!(tracker.state().confirmed_event_count(), 0);
    }

    #[test]
    fn streak_confirms_one_event_and_rebases() {
        let mut tracker = MotionTracker::new(thresholds(4, 2), frame(0));

        for i in 1..4u8 {
            assert_eq!(tracker.observe(true, frame(i)), Transition::Counted);
            assert_eq!(tracker.state().consecutive_motion_count(), u32::from(i));
            assert_eq!(tracker.background(), &frame(0));
        }
        assert_eq!(tracker.phase(), TrackerPhase::Accumulating);

        assert_eq!(tracker.observe(true, frame(9)), Transition::EventConfirmed { events: 1 });
        assert_eq!(tracker.state().consecutive_motion_count(), 0);
        assert_eq!(tracker.background(), &frame(9));

        assert_eq!(tracker.observe(false, frame(10)), Transition::Counted);
        assert_eq!(tracker.state().confirmed_event_count(), 1);
        assert_eq!(tracker.background(), &frame(9));
    }

    #[test]
    fn quiet_frame_breaks_the_streak() {
        let mut tracker = MotionTracker::new(thresholds(3, 2), frame(0));
        tracker.observe(true, frame(1));
        tracker.observe(true, frame(2));
        tracker.observe(false, frame(3));
        assert_eq!(tracker.state().consecutive_motion_count(), 0);
        tracker.observe(true, frame(4));
        tracker.observe(true, frame(5));
        assert_eq!(tracker.state().confirmed_event_count(), 0);
        assert_eq!(tracker.background(), &frame(0));
    }

    #[test]
    fn quiet_frames_keep_confirmed_events() {
        let mut tracker = MotionTracker::new(thresholds(2, 3), frame(0));
        let pattern = [true, true, false, false, false, true, false, true, true];
        let transitions: Vec<_> = pattern
            .iter()
            .enumerate()
            .map(|(i, &moved)| tracker.observe(moved, frame(i as u8)))
            .collect();

        assert_eq!(transitions[1], Transition::EventConfirmed { events: 1 });
        assert_eq!(tracker.state().confirmed_event_count(), 2);
        assert_eq!(tracker.phase(), TrackerPhase::Accumulating);

        tracker.observe(true, frame(20));
        assert_eq!(tracker.observe(true, frame(21)), Transition::Alert { events: 3 });
        assert_eq!(tracker.phase(), TrackerPhase::Alerting);
    }

    #[test]
    fn alert_fires_exactly_at_event_threshold() {
        let t = thresholds(2, 2);
        let mut tracker = MotionTracker::new(t, frame(0));
        let mut alert_at = None;
        for i in 0..10u8 {
            if let Transition::Alert { events } = tracker.observe(true, frame(i)) {
                alert_at = Some((i, events));
                break;
            }
        }
        assert_eq!(alert_at, Some((3, 2)));
    }

    #[test]
    fn terminal_phases_ignore_further_frames() {
        let mut tracker = MotionTracker::new(thresholds(2, 2), frame(0));
        for i in 0..4u8 {
            tracker.observe(true, frame(i));
        }
        assert_eq!(tracker.phase(), TrackerPhase::Alerting);
        assert_eq!(tracker.observe(true, frame(50)), Transition::Halted);
        assert_eq!(tracker.state().confirmed_event_count(), 2);

        let mut failed = MotionTracker::new(thresholds(2, 2), frame(0));
        failed.fail();
        assert!(failed.phase().is_terminal());
        assert_eq!(failed.observe(true, frame(1)), Transition::Halted);
        assert_eq!(failed.state().consecutive_motion_count(), 0);
    }
}
