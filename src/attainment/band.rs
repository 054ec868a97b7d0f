//! The two discretizations used across the dashboard.
//!
//! Per-student score banding uses the instructor-configured thresholds from
//! the subject definition. Program-target levels use the fixed institutional
//! breakpoints (80/70). They look alike but encode different policies, so
//! they stay separate functions.

/// A per-student score band on the 1..3 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    One,
    Two,
    Three,
}

impl Band {
    /// Numeric value of the band (1, 2 or 3).
    pub fn value(self) -> u8 {
        match self {
            Band::One => 1,
            Band::Two => 2,
            Band::Three => 3,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Band a raw score against the instructor-configured thresholds.
///
/// The raw score is clamped to `[0, max_marks]` first; a score above the
/// maximum counts as the maximum, silently. The threshold3 branch is checked
/// before threshold2 on purpose: the config layer does not enforce
/// `threshold2 <= threshold3`, and this evaluation order is what keeps a
/// misconfigured pair well-defined.
///
/// A non-positive `max_marks` yields `Band::One` (no percentage can be
/// formed, so the neutral band applies).
pub fn score_band(raw_score: f64, max_marks: f64, threshold2: f64, threshold3: f64) -> Band {
    if max_marks <= 0.0 {
        return Band::One;
    }
    let clamped = raw_score.clamp(0.0, max_marks);
    let percentage = clamped / max_marks * 100.0;
    if percentage >= threshold3 {
        Band::Three
    } else if percentage >= threshold2 {
        Band::Two
    } else {
        Band::One
    }
}

/// Discretize a weighted attainment percentage against the fixed program
/// targets: level 3 at >= 80%, level 2 at >= 70%, level 1 below.
///
/// Not the same thing as [`score_band`]: these breakpoints are institutional
/// policy, not per-subject configuration.
pub fn target_level(weighted_attainment: f64) -> u8 {
    if weighted_attainment >= 80.0 {
        3
    } else if weighted_attainment >= 70.0 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_marks_is_band_three() {
        assert_eq!(score_band(50.0, 50.0, 60.0, 80.0), Band::Three);
        assert_eq!(score_band(100.0, 100.0, 60.0, 100.0), Band::Three);
    }

    #[test]
    fn test_banding_scenario() {
        // max 100, threshold2=60, threshold3=80
        assert_eq!(score_band(75.0, 100.0, 60.0, 80.0), Band::Two);
        assert_eq!(score_band(80.0, 100.0, 60.0, 80.0), Band::Three);
        assert_eq!(score_band(59.0, 100.0, 60.0, 80.0), Band::One);
    }

    #[test]
    fn test_clamp_above_max() {
        // A raw score above max behaves exactly like the max itself
        let over = score_band(130.0, 100.0, 60.0, 80.0);
        let exact = score_band(100.0, 100.0, 60.0, 80.0);
        assert_eq!(over, exact);
    }

    #[test]
    fn test_clamp_below_zero() {
        assert_eq!(score_band(-5.0, 100.0, 60.0, 80.0), Band::One);
    }

    #[test]
    fn test_threshold_boundaries_inclusive() {
        assert_eq!(score_band(60.0, 100.0, 60.0, 80.0), Band::Two);
        assert_eq!(score_band(79.9, 100.0, 60.0, 80.0), Band::Two);
    }

    #[test]
    fn test_inverted_thresholds_still_defined() {
        // threshold2 > threshold3 is not rejected anywhere; the threshold3
        // check runs first, so 70% lands in band 3 here.
        assert_eq!(score_band(70.0, 100.0, 80.0, 60.0), Band::Three);
        assert_eq!(score_band(50.0, 100.0, 80.0, 60.0), Band::One);
    }

    #[test]
    fn test_zero_max_marks_is_neutral() {
        assert_eq!(score_band(10.0, 0.0, 60.0, 80.0), Band::One);
    }

    #[test]
    fn test_target_level_breakpoints() {
        assert_eq!(target_level(80.0), 3);
        assert_eq!(target_level(100.0), 3);
        assert_eq!(target_level(79.9), 2);
        assert_eq!(target_level(70.0), 2);
        assert_eq!(target_level(69.9), 1);
        assert_eq!(target_level(0.0), 1);
    }

    #[test]
    fn test_band_values() {
        assert_eq!(Band::One.value(), 1);
        assert_eq!(Band::Two.value(), 2);
        assert_eq!(Band::Three.value(), 3);
    }
}
