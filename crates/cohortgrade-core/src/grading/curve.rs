//! Piecewise relative-grading curve
//!
//! | ratio          | grade                       |
//! |----------------|-----------------------------|
//! | ≥ 1.0          | 100                         |
//! | [0.95, 1.0)    | 90 + (ratio − 0.95) · 180   |
//! | [0.80, 0.95)   | 75 + (ratio − 0.80) · 100   |
//! | [0.60, 0.80)   | 60 + (ratio − 0.60) · 75    |
//! | < 0.60         | ratio · 100                 |
//!
//! The result is always clamped to `[0, 100]`.

pub const MAX_GRADE: f64 = 100.0;

/// Map a ratio to the best performer onto a grade
pub fn curve_grade(ratio: f64) -> f64 {
    let grade = if ratio >= 1.0 {
        MAX_GRADE
    } else if ratio >= 0.95 {
        90.0 + (ratio - 0.95) * 180.0
    } else if ratio >= 0.80 {
        75.0 + (ratio - 0.80) * 100.0
    } else if ratio >= 0.60 {
        60.0 + (ratio - 0.60) * 75.0
    } else {
        ratio * 100.0
    };

    if grade.is_nan() {
        0.0
    } else {
        grade.clamp(0.0, MAX_GRADE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_segment_anchors() {
        assert!(close(curve_grade(1.0), 100.0));
        assert!(close(curve_grade(0.95), 90.0));
        assert!(close(curve_grade(0.80), 75.0));
        assert!(close(curve_grade(0.60), 60.0));
        assert!(close(curve_grade(0.0), 0.0));
        assert!(close(curve_grade(0.335), 33.5));
    }

    #[test]
    fn test_continuous_at_lower_boundaries() {
        for boundary in [0.60, 0.80, 0.95] {
            let below = curve_grade(boundary - 1e-9);
            let at = curve_grade(boundary);
            assert!((at - below).abs() < 1e-5, "jump at {}", boundary);
        }
    }

    #[test]
    fn test_monotonic() {
        let mut previous = curve_grade(0.0);
        for step in 1..=1000 {
            let grade = curve_grade(step as f64 / 1000.0);
            assert!(grade >= previous);
            previous = grade;
        }
    }

    #[test]
    fn test_clamped() {
        assert_eq!(curve_grade(1.7), 100.0);
        assert_eq!(curve_grade(-0.5), 0.0);
        assert_eq!(curve_grade(f64::NAN), 0.0);
    }
}
