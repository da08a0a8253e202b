//! # Tetragon Tussle
//!
//! Tile-based multiplayer arena simulation: square player bodies driven by
//! input, gravity and friction, kept out of wall tiles and out of each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TETRAGON TUSSLE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/              - Primitives                             │
//! │  ├── vec2.rs        - 2D vector and axis selector            │
//! │  ├── aabb.rs        - Axis-aligned boxes and push-out        │
//! │  ├── maths.rs       - Interval and angle helpers             │
//! │  ├── increments.rs  - Sub-step generator                     │
//! │  ├── store.rs       - Mutable-while-iterating entity store   │
//! │  ├── rng.rs         - Deterministic Xorshift128+ PRNG        │
//! │  └── hash.rs        - State hashing for replay checks        │
//! │                                                              │
//! │  game/              - Simulation                             │
//! │  ├── board.rs       - Tile grid                              │
//! │  ├── movement.rs    - Velocity shaping                       │
//! │  ├── collision.rs   - Contact resolution                     │
//! │  ├── simulation.rs  - Frame driver                           │
//! │  └── weapons.rs     - Entity collaborators                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The simulation is single-threaded and iterates stores in id order. The
//! only randomness is the cramming nudge, drawn from a seeded RNG, so two runs
//! fed the same inputs and frame timestamps end with the same
//! [`Simulation::state_hash`].
//!
//! ## Units
//!
//! Distances are in tiles, time in milliseconds, and +y points down the board.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use core::aabb::Aabb;
pub use core::store::{EntityId, Store};
pub use core::vec2::{Axis, Vec2};
pub use error::{GeometryError, MapError, SimError};
pub use game::config::{PhysicsConfig, SimConfig};
pub use game::simulation::Simulation;
pub use game::state::{PlayerConfig, PlayerHandle, PlayerState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
