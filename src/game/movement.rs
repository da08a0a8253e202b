//! Velocity Shaping
//!
//! Turns a player's input, last-frame contact and elapsed time into this
//! frame's velocity, before any position changes. Pure functions over plain
//! values; the simulation applies the result.

use std::f64::consts::FRAC_PI_4;

use crate::core::maths::between;
use crate::core::vec2::{Axis, Vec2};
use crate::game::config::PhysicsConfig;

/// Add `change` to `v`, clamped to `[-bound, bound]` only in the direction of
/// the change.
///
/// A change that opposes the current velocity applies in full. A change in the
/// same direction never pushes the magnitude past `bound`, and never reduces a
/// magnitude that is already past it.
#[inline]
pub fn bounded_update(v: f64, bound: f64, change: f64) -> f64 {
    if change > 0.0 {
        v.max(bound.min(v + change))
    } else {
        v.min((-bound).max(v + change))
    }
}

/// True if a contact correction points like a floor push: its angle lies
/// strictly within 45 degrees of straight down (+y), which is what standing on
/// a tile leaves behind.
#[inline]
pub fn is_floor_contact(collision: Vec2) -> bool {
    between(FRAC_PI_4, collision.angle(), 3.0 * FRAC_PI_4)
}

/// True if the input requests a jump.
#[inline]
pub fn wants_jump(input: Vec2, cfg: &PhysicsConfig) -> bool {
    input.y() < -cfg.jump_threshold
}

/// Input acceleration, jump, friction and gravity for one frame.
///
/// `collision` is the whole-frame correction from the previous frame.
pub fn shape_velocity(
    velocity: Vec2,
    input: Vec2,
    collision: Option<Vec2>,
    dt: f64,
    cfg: &PhysicsConfig,
) -> Vec2 {
    let mut v = velocity.with(
        Axis::X,
        bounded_update(velocity.x(), cfg.max_move, input.x() * cfg.accel * dt),
    );

    v = match collision {
        Some(contact) if wants_jump(input, cfg) => {
            let speed = if is_floor_contact(contact) {
                cfg.jump_velocity
            } else {
                cfg.wall_jump_velocity()
            };
            v.with_y(-speed)
        }
        _ => v.with_y(bounded_update(v.y(), cfg.max_y_move, input.y() * cfg.y_accel * dt)),
    };

    if let Some(contact) = collision {
        v = apply_friction(v, input, contact, dt, cfg);
    }

    v + Vec2::new(0.0, cfg.gravity * dt)
}

/// Contact drag. Horizontal speed decays on a floor or ceiling when there is
/// no horizontal input; vertical speed decays against a wall.
pub fn apply_friction(v: Vec2, input: Vec2, contact: Vec2, dt: f64, cfg: &PhysicsConfig) -> Vec2 {
    let drag = cfg.friction_base.powf(dt);
    let mut v = v;
    if contact.y() != 0.0 && input.x() == 0.0 {
        let x = if v.x().abs() < cfg.friction_epsilon { 0.0 } else { v.x() * drag };
        v = v.with_x(x);
    }
    if contact.x() != 0.0 {
        v = v.with_y(v.y() * drag);
    }
    v
}
