//! Axis-Aligned Boxes
//!
//! Rectangles defined by their min and max corners. Players, wall tiles and
//! bullets all collide as boxes; there is no rotation.

use std::fmt;
use serde::{Deserialize, Serialize};

use super::maths::between;
use super::vec2::{Axis, Vec2};

/// Axis-aligned rectangle.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Sentinel for "no overlap".
    pub const EMPTY: Self = Self { min: Vec2::ZERO, max: Vec2::ZERO };

    /// Create a box from its corners. `min` must not exceed `max` on either axis.
    #[inline]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x() <= max.x() && min.y() <= max.y(), "inverted box {min} {max}");
        Self { min, max }
    }

    /// Square of half-extent `radius` centred on `center`.
    #[inline]
    pub fn square(center: Vec2, radius: f64) -> Self {
        let diag = Vec2::diag(radius);
        Self::new(center - diag, center + diag)
    }

    /// The unit box covering the tile cell whose min corner is `cell`.
    #[inline]
    pub fn cell(cell: Vec2) -> Self {
        Self::new(cell, cell + Vec2::diag(1.0))
    }

    /// Min corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Max corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    /// Extent along y.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y() - self.min.y()
    }

    /// Width times height.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Midpoint of the box.
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max).scale(0.5)
    }

    /// True if the box has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// True if `p` lies strictly inside the box.
    pub fn contains(&self, p: Vec2) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| between(self.min.get(axis), p.get(axis), self.max.get(axis)))
    }

    /// Intersection rectangle, or [`Aabb::EMPTY`] if the boxes are disjoint.
    pub fn overlap(&self, other: &Aabb) -> Aabb {
        let xmin = self.min.x().max(other.min.x());
        let xmax = self.max.x().min(other.max.x());
        if xmax < xmin {
            return Aabb::EMPTY;
        }
        let ymin = self.min.y().max(other.min.y());
        let ymax = self.max.y().min(other.max.y());
        if ymax < ymin {
            return Aabb::EMPTY;
        }
        Aabb::new(Vec2::new(xmin, ymin), Vec2::new(xmax, ymax))
    }

    /// True if the boxes share a region of nonzero area.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !self.overlap(other).is_empty()
    }

    /// Minimal translation that moves `collider` out of `self`.
    ///
    /// Returns `None` when the boxes do not overlap. Otherwise the offset
    /// resolves the side with the smallest penetration depth; on equal depths
    /// the first one in the order -x, +x, -y, +y wins.
    pub fn push_out(&self, collider: &Aabb) -> Option<Vec2> {
        let xneg = collider.max.x() - self.min.x();
        if xneg <= 0.0 {
            return None;
        }
        let xpos = self.max.x() - collider.min.x();
        if xpos <= 0.0 {
            return None;
        }
        let yneg = collider.max.y() - self.min.y();
        if yneg <= 0.0 {
            return None;
        }
        let ypos = self.max.y() - collider.min.y();
        if ypos <= 0.0 {
            return None;
        }

        let candidates = [
            (xneg, Vec2::new(-xneg, 0.0)),
            (xpos, Vec2::new(xpos, 0.0)),
            (yneg, Vec2::new(0.0, -yneg)),
            (ypos, Vec2::new(0.0, ypos)),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        Some(best.1)
    }

    /// Copy moved by `offset`.
    #[inline]
    pub fn translate(&self, offset: Vec2) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }
}

impl fmt::Debug for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aabb({}, {})", self.min, self.max)
    }
}

/// Clamp `velocity` so it no longer points into the surface that produced `bump`.
///
/// A negative bump on an axis caps that velocity component at zero from above,
/// a positive bump from below. Axes the bump does not touch are returned as-is.
pub fn bump_adjust_velocity(bump: Vec2, velocity: Vec2) -> Vec2 {
    let adjust = |axis: Axis| {
        let b = bump.get(axis);
        let v = velocity.get(axis);
        if b == 0.0 {
            v
        } else if b < 0.0 {
            v.min(0.0)
        } else {
            v.max(0.0)
        }
    };
    Vec2::new(adjust(Axis::X), adjust(Axis::Y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bx(x0: f64, y0: f64, x1: f64, y1: f64) -> Aabb {
        Aabb::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn test_box_dimensions() {
        let b = bx(1.0, 2.0, 4.0, 3.0);
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 1.0);
        assert_eq!(b.area(), 3.0);
        assert_eq!(b.center(), Vec2::new(2.5, 2.5));
        assert!(Aabb::EMPTY.is_empty());
    }

    #[test]
    fn test_square() {
        let sq = Aabb::square(Vec2::new(1.0, 1.0), 0.25);
        assert_eq!(sq.min(), Vec2::new(0.75, 0.75));
        assert_eq!(sq.max(), Vec2::new(1.25, 1.25));
    }

    #[test]
    fn test_contains_is_strict_per_axis() {
        let b = bx(0.0, 0.0, 10.0, 2.0);
        assert!(b.contains(Vec2::new(5.0, 1.0)));
        // y is checked against the y extent, not the x extent
        assert!(!b.contains(Vec2::new(1.0, 5.0)));
        assert!(!b.contains(Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_overlap() {
        let a = bx(0.0, 0.0, 2.0, 2.0);
        let b = bx(1.0, 1.0, 3.0, 3.0);
        assert_eq!(a.overlap(&b), bx(1.0, 1.0, 2.0, 2.0));
        assert!(a.overlaps(&b));

        let far = bx(5.0, 5.0, 6.0, 6.0);
        assert_eq!(a.overlap(&far), Aabb::EMPTY);
        assert!(!a.overlaps(&far));

        // Touching edges share no area
        let touching = bx(2.0, 0.0, 3.0, 2.0);
        assert!(!a.overlaps(&touching));
    }

    #[test]
    fn test_push_out_smallest_side() {
        let wall = bx(0.0, 0.0, 1.0, 1.0);
        // Player sinks 0.1 into the top of the wall
        let player = bx(0.25, -0.4, 0.75, 0.1);
        assert_eq!(wall.push_out(&player), Some(Vec2::new(0.0, -0.1)));

        // Player overlaps the right side by 0.2
        let player = bx(0.8, 0.25, 1.3, 0.75);
        let push = wall.push_out(&player).unwrap();
        assert!((push.x() - 0.2).abs() < 1e-12);
        assert_eq!(push.y(), 0.0);
    }

    #[test]
    fn test_push_out_none_when_touching() {
        let wall = bx(0.0, 0.0, 1.0, 1.0);
        let player = bx(1.0, 0.0, 1.5, 0.5);
        assert_eq!(wall.push_out(&player), None);
    }

    #[test]
    fn test_push_out_tie_prefers_x() {
        let wall = bx(0.0, 0.0, 1.0, 1.0);
        // Corner overlap of 0.25 on both x and y
        let player = bx(-0.25, -0.25, 0.25, 0.25);
        assert_eq!(wall.push_out(&player), Some(Vec2::new(-0.25, 0.0)));
    }

    #[test]
    fn test_bump_adjust_velocity() {
        let v = Vec2::new(0.3, 0.7);
        // Pushed up out of a floor: downward velocity removed, x untouched
        assert_eq!(bump_adjust_velocity(Vec2::new(0.0, -0.1), v), Vec2::new(0.3, 0.0));
        // Pushed right: velocity already moving right is kept
        assert_eq!(bump_adjust_velocity(Vec2::new(0.1, 0.0), v), v);
        // Pushed left: rightward velocity removed
        assert_eq!(bump_adjust_velocity(Vec2::new(-0.1, 0.0), v), Vec2::new(0.0, 0.7));
    }

    // Coordinates on a 1/8 grid keep every subtraction exact.
    fn grid_box() -> impl Strategy<Value = Aabb> {
        (-40i32..40, -40i32..40, 1i32..24, 1i32..24).prop_map(|(x, y, w, h)| {
            let min = Vec2::new(x as f64 / 8.0, y as f64 / 8.0);
            let max = Vec2::new((x + w) as f64 / 8.0, (y + h) as f64 / 8.0);
            Aabb::new(min, max)
        })
    }

    proptest! {
        #[test]
        fn prop_push_out_matches_overlap(a in grid_box(), b in grid_box()) {
            let push = a.push_out(&b);
            if !a.overlaps(&b) {
                prop_assert!(push.is_none());
            } else {
                let push = push.unwrap();
                let depths = [
                    b.max().x() - a.min().x(),
                    a.max().x() - b.min().x(),
                    b.max().y() - a.min().y(),
                    a.max().y() - b.min().y(),
                ];
                let smallest = depths.iter().cloned().fold(f64::INFINITY, f64::min);
                prop_assert_eq!(push.length(), smallest);
                prop_assert!(push.x() == 0.0 || push.y() == 0.0);
                prop_assert!(a.push_out(&b.translate(push)).is_none());
            }
        }

        #[test]
        fn prop_bump_preserves_orthogonal_component(
            vx in -1.0f64..1.0, vy in -1.0f64..1.0, depth in 0.001f64..1.0, neg in any::<bool>()
        ) {
            let v = Vec2::new(vx, vy);
            let bump = Vec2::new(if neg { -depth } else { depth }, 0.0);
            let adjusted = bump_adjust_velocity(bump, v);
            prop_assert_eq!(adjusted.y().to_bits(), vy.to_bits());
        }
    }
}
