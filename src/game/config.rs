//! Physics tuning and simulation configuration.
//!
//! Units: distances in tiles, time in milliseconds, +y points down the board.
//! Velocities are tiles per millisecond, accelerations tiles per ms per ms.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Movement and collision constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal speed cap for input-driven acceleration
    pub max_move: f64,
    /// Vertical speed cap for input-driven acceleration
    pub max_y_move: f64,
    /// Horizontal acceleration per ms at full input
    pub accel: f64,
    /// Vertical acceleration per ms at full input
    pub y_accel: f64,
    /// Upward speed set by a floor jump
    pub jump_velocity: f64,
    /// Wall jump speed as a fraction of `jump_velocity`
    pub wall_jump_factor: f64,
    /// Upward input past this magnitude requests a jump
    pub jump_threshold: f64,
    /// Per-ms velocity retention while in contact
    pub friction_base: f64,
    /// Horizontal speeds below this snap to zero under friction
    pub friction_epsilon: f64,
    /// Downward acceleration per ms
    pub gravity: f64,
    /// Half-extent of a player's collision square
    pub player_radius: f64,
    /// Distance past the board edge a player may travel before elimination
    pub play_area_margin: f64,
    /// Cap on sub-step increments per frame
    pub max_increments: usize,
    /// Half-width of the random velocity nudge applied on cramming
    pub cramming_nudge: f64,
    /// Hit points at spawn
    pub starting_hp: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_move: 0.01,
            max_y_move: 0.0006,
            accel: 0.00005,
            y_accel: 0.000015,
            jump_velocity: 0.01,
            wall_jump_factor: 0.6,
            jump_threshold: 0.5,
            friction_base: 0.99,
            friction_epsilon: 0.000001,
            gravity: 0.00003,
            player_radius: 0.25,
            play_area_margin: 4.0,
            max_increments: 10_000,
            cramming_nudge: 0.001,
            starting_hp: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Reject values the integrator cannot run with: every real constant must
    /// be finite, the player radius positive, and at least one increment
    /// allowed per frame.
    pub fn validate(&self) -> Result<(), SimError> {
        let reals = [
            ("max_move", self.max_move),
            ("max_y_move", self.max_y_move),
            ("accel", self.accel),
            ("y_accel", self.y_accel),
            ("jump_velocity", self.jump_velocity),
            ("wall_jump_factor", self.wall_jump_factor),
            ("jump_threshold", self.jump_threshold),
            ("friction_base", self.friction_base),
            ("friction_epsilon", self.friction_epsilon),
            ("gravity", self.gravity),
            ("player_radius", self.player_radius),
            ("play_area_margin", self.play_area_margin),
            ("cramming_nudge", self.cramming_nudge),
            ("starting_hp", self.starting_hp),
        ];
        if let Some(&(field, _)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimError::InvalidPhysics { field, reason: "must be finite" });
        }
        if self.player_radius <= 0.0 {
            return Err(SimError::InvalidPhysics { field: "player_radius", reason: "must be positive" });
        }
        if self.max_increments == 0 {
            return Err(SimError::InvalidPhysics { field: "max_increments", reason: "must be at least 1" });
        }
        Ok(())
    }

    /// Speed set by a jump off a wall.
    #[inline]
    pub fn wall_jump_velocity(&self) -> f64 {
        self.jump_velocity * self.wall_jump_factor
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Movement and collision constants
    pub physics: PhysicsConfig,
    /// Seed for the cramming nudge RNG
    pub rng_seed: u64,
}

impl SimConfig {
    /// Load from JSON; missing fields take their defaults. The physics
    /// constants are validated.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.physics.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
