//! Game Logic Module
//!
//! The arena simulation and the collaborators built on it.
//!
//! ## Module Structure
//!
//! - `board`: Tile grid and its text format
//! - `maps`: Built-in arenas
//! - `config`: Physics tuning, JSON-loadable
//! - `input`: Movement-input capability and input sources
//! - `state`: Player configuration, per-life state, handles
//! - `entity`: Generic per-frame entity hooks
//! - `surface`: Rendering surface contract
//! - `events`: Elimination events
//! - `movement`: Velocity shaping
//! - `collision`: Sub-stepped integration and contact resolution
//! - `simulation`: The frame driver
//! - `weapons`: Gun, bullet, shield
//! - `modes`: Game modes

pub mod board;
pub mod maps;
pub mod config;
pub mod input;
pub mod state;
pub mod entity;
pub mod surface;
pub mod events;
pub mod movement;
pub mod collision;
pub mod simulation;
pub mod weapons;
pub mod modes;

// Re-export key types
pub use board::{Board, Tile};
pub use config::{PhysicsConfig, SimConfig};
pub use entity::{Entity, EntityCell};
pub use events::Elimination;
pub use input::{IdleInput, KeyState, KeyboardInput, Keybinds, MoveSet, ScriptedInput};
pub use simulation::Simulation;
pub use state::{EntityHandle, PlayerConfig, PlayerHandle, PlayerState};
pub use surface::{RecordingSurface, Surface};
