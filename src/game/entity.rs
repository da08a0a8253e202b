//! Generic entity hook contract.
//!
//! Anything that is not a player (weapons, projectiles, game modes) lives in
//! the simulation's entity store as a boxed [`Entity`]. The simulation never
//! looks inside; it only calls the two hooks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::game::simulation::Simulation;
use crate::game::state::EntityHandle;
use crate::game::surface::Surface;

/// Per-frame behaviour of a non-player object. Both hooks default to no-ops.
pub trait Entity {
    /// Called once per frame while the entity is live, before players move.
    /// `dt` is the elapsed time in ms.
    fn tick(&mut self, _handle: EntityHandle, _sim: &mut Simulation, _dt: f64) {}

    /// Paint onto `surface`. Called after players are drawn.
    fn draw(&self, _surface: &mut dyn Surface) {}
}

/// Shared cell an entity lives in. The simulation clones the `Rc` out of the
/// store before ticking, so an entity may destroy itself mid-tick.
pub type EntityCell = Rc<RefCell<dyn Entity>>;

/// Wrap a behaviour for storage.
pub fn entity_cell(behavior: impl Entity + 'static) -> EntityCell {
    Rc::new(RefCell::new(behavior))
}
