//! Rendering surface contract.
//!
//! Drawing happens outside this crate; the simulation only describes what to
//! paint, in board units.

use crate::core::aabb::Aabb;

/// Something the simulation can paint filled rectangles onto.
pub trait Surface {
    /// Fill `area` with a CSS-style colour string.
    fn fill_box(&mut self, area: Aabb, color: &str);
}

/// Surface that records every fill, for headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    /// Fills in paint order
    pub fills: Vec<(Aabb, String)>,
}

impl Surface for RecordingSurface {
    fn fill_box(&mut self, area: Aabb, color: &str) {
        self.fills.push((area, color.to_string()));
    }
}
