//! 2D Vector
//!
//! Immutable value type for positions, velocities and push-out offsets.
//! Every operation returns a new value; components are always finite.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Axis selector for per-component access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis
    X,
    /// Vertical axis (+y points down the board)
    Y,
}

impl Axis {
    /// Both axes, x first.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// The other axis.
    #[inline]
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// 2D vector with finite `f64` components.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };

    /// Unit vector pointing up the board (-Y)
    pub const UP: Self = Self { x: 0.0, y: -1.0 };

    /// Unit vector pointing down the board (+Y)
    pub const DOWN: Self = Self { x: 0.0, y: 1.0 };

    /// Create a vector from components that are known to be finite.
    ///
    /// Use [`Vec2::try_new`] for values coming from outside the simulation.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(x.is_finite() && y.is_finite(), "non-finite vector ({x}, {y})");
        Self { x, y }
    }

    /// Create a vector, rejecting NaN and infinite components.
    pub fn try_new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(GeometryError::NonFinite { x, y })
        }
    }

    /// Vector with both components equal to `n`.
    #[inline]
    pub fn diag(n: f64) -> Self {
        Self::new(n, n)
    }

    /// X component.
    #[inline]
    pub fn x(self) -> f64 {
        self.x
    }

    /// Y component.
    #[inline]
    pub fn y(self) -> f64 {
        self.y
    }

    /// Component along `axis`.
    #[inline]
    pub fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Copy with the component along `axis` replaced.
    #[inline]
    pub fn with(self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => Self::new(value, self.y),
            Axis::Y => Self::new(self.x, value),
        }
    }

    /// Copy with x replaced.
    #[inline]
    pub fn with_x(self, x: f64) -> Self {
        self.with(Axis::X, x)
    }

    /// Copy with y replaced.
    #[inline]
    pub fn with_y(self, y: f64) -> Self {
        self.with(Axis::Y, y)
    }

    /// Apply `f` to each component.
    #[inline]
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, n: f64) -> Self {
        self.map(|c| c * n)
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Normalize to unit length.
    /// Returns ZERO if the vector is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        self.scale(1.0 / self.length())
    }

    /// Signed angle in radians, `atan2(y, x)`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// True if both components are exactly zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component pair, for hosts that render with plain tuples.
    #[inline]
    pub fn to_pair(self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Floor each component.
    #[inline]
    pub fn floor(self) -> Self {
        self.map(f64::floor)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vec2::add(self, rhs)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Vec2::sub(self, rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{})", self.x, self.y)
    }
}
