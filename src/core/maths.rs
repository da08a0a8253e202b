//! Scalar helpers shared by the movement and collision code.

use std::f64::consts::{PI, TAU};

/// True if `mid` lies strictly between `start` and `end`, in either order.
#[inline]
pub fn between(start: f64, mid: f64, end: f64) -> bool {
    (start < mid && mid < end) || (start > mid && mid > end)
}

/// Signed difference `a - b` between two angles, wrapped into `[-PI, PI]`.
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_between_is_open_and_symmetric() {
        assert!(between(0.0, 0.5, 1.0));
        assert!(between(1.0, 0.5, 0.0));
        assert!(!between(0.0, 0.0, 1.0));
        assert!(!between(0.0, 1.0, 1.0));
        assert!(!between(0.0, 2.0, 1.0));
    }

    #[test]
    fn test_angle_diff_wraps() {
        assert!((angle_diff(FRAC_PI_2, 0.0) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle_diff(0.0, FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
        // Across the +-PI seam: 170 deg vs -170 deg are 20 deg apart
        let a = 170f64.to_radians();
        let b = -170f64.to_radians();
        assert!((angle_diff(a, b).abs() - 20f64.to_radians()).abs() < 1e-12);
        assert!((angle_diff(b, a).abs() - 20f64.to_radians()).abs() < 1e-12);
    }
}
