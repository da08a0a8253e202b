//! Core primitives.
//!
//! Geometry, the sub-step generator, the keyed entity store and the
//! deterministic helpers the simulation is built from.

pub mod vec2;
pub mod aabb;
pub mod maths;
pub mod increments;
pub mod store;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::{Axis, Vec2};
pub use aabb::{bump_adjust_velocity, Aabb};
pub use increments::Increments;
pub use store::{Cursor, EntityId, Store};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
