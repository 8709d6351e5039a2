// THEORY:
// A relocated camera shifts its whole field of view, so pixels change across
// both a horizontal border (top or bottom) and a vertical border (left or
// right) at once. Partial occlusion tends to hit one side only. The classifier
// therefore asks for both axes, or one axis backed by a generally changed
// frame, before calling a frame "moved".

use crate::core_modules::change_scorer::RegionScore;
use crate::core_modules::sensitivity::Percent;

/// Decides whether one scored frame indicates motion.
pub fn classify(score: &RegionScore, change_threshold: Percent) -> bool {
    let exceeds = |value: Percent| value > change_threshold;

    let vert = exceeds(score.top) || exceeds(score.bottom);
    let horz = exceeds(score.left) || exceeds(score.right);

    if vert && horz {
        true
    } else {
        (vert || horz) && exceeds(score.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn score(top: u8, bottom: u8, left: u8, right: u8, total: u8) -> RegionScore {
        RegionScore {
            top,
            bottom,
            left,
            right,
            total,
        }
    }

    #[test]
    fn both_axes_is_motion() {
        assert!(classify(&score(50, 0, 0, 50, 0), 45));
        assert!(classify(&score(0, 50, 50, 0, 0), 45));
    }

    #[test]
    fn one_axis_needs_a_changed_frame() {
        assert!(!classify(&score(90, 90, 0, 0, 45), 45));
        assert!(classify(&score(90, 90, 0, 0, 46), 45));
        assert!(classify(&score(0, 0, 0, 60, 80), 45));
    }

    #[test]
    fn central_change_alone_is_not_motion() {
        assert!(!classify(&score(0, 0, 0, 0, 100), 45));
    }

    #[test]
    fn comparison_is_strict() {
        assert!(!classify(&score(45, 45, 45, 45, 45), 45));
        assert!(classify(&score(46, 0, 46, 0, 0), 45));
    }

    #[test]
    fn zero_threshold_reacts_to_any_border_change() {
        assert!(classify(&score(1, 0, 1, 0, 0), 0));
        assert!(!classify(&RegionScore::default(), 0));
    }

    #[test]
    fn full_threshold_never_fires() {
        assert!(!classify(&score(100, 100, 100, 100, 100), 100));
    }

    proptest! {
        #[test]
        fn all_edges_above_threshold_is_motion(threshold in 0u8..100, total in 0u8..=100) {
            let edge = threshold + 1;
            prop_assert!(classify(&score(edge, edge, edge, edge, total), threshold));
        }

        #[test]
        fn all_zero_is_never_motion(threshold in 0u8..=100) {
            prop_assert!(!classify(&RegionScore::default(), threshold));
        }
    }
}
