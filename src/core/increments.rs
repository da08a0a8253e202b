//! Sub-step Generator
//!
//! Cuts a frame's displacement into pieces no longer than a step length so a
//! fast body cannot skip over a thin wall between two collision checks.

use super::vec2::Vec2;

/// Iterator over the increments of a displacement.
///
/// Yields up to `max - 1` full-length steps along the displacement's
/// direction, then one final remainder (possibly zero). When the cap cuts the
/// full steps short, the final increment is the ordinary sub-step remainder
/// and the rest of the displacement is dropped for this frame.
#[derive(Clone, Debug)]
pub struct Increments {
    step: Vec2,
    full_steps: usize,
    remainder: Option<Vec2>,
}

impl Increments {
    /// Split `displacement` into increments of at most `step_len`, yielding no
    /// more than `max` increments in total.
    pub fn new(displacement: Vec2, step_len: f64, max: usize) -> Self {
        debug_assert!(step_len > 0.0, "step length must be positive");
        let max = max.max(1);
        let dir = displacement.normalize();
        let step = dir.scale(step_len);
        let length = displacement.length();
        let whole = (length / step_len).floor() as usize;

        let (full_steps, remainder) = if whole < max {
            (whole, displacement - step.scale(whole as f64))
        } else {
            (max - 1, dir.scale(length % step_len))
        };

        Self {
            step,
            full_steps,
            remainder: Some(remainder),
        }
    }
}

impl Iterator for Increments {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.full_steps > 0 {
            self.full_steps -= 1;
            return Some(self.step);
        }
        self.remainder.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.full_steps + usize::from(self.remainder.is_some());
        (n, Some(n))
    }
}

impl ExactSizeIterator for Increments {}
