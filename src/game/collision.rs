//! Collision Resolution
//!
//! Sub-stepped position integration for one player: advance by an increment,
//! push out of nearby wall tiles closest first, then separate from every other
//! player. Motion stops at the first increment that needed any correction.

use std::f64::consts::FRAC_PI_4;

use tracing::warn;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::aabb::Aabb;
use crate::core::increments::Increments;
use crate::core::maths::angle_diff;
use crate::core::rng::DeterministicRng;
use crate::core::store::{EntityId, Store};
use crate::core::vec2::Vec2;
use crate::game::board::Board;
use crate::game::config::PhysicsConfig;
use crate::game::state::PlayerState;

/// Corner directions of a player's collision square.
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)];

/// How a player-player overlap gets resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Neither side is pinned: each moves half the push-out.
    Split,
    /// The other side is pinned: the moving player takes the full push-out.
    PushSelf,
    /// The moving player is pinned: the other takes the full push-out.
    PushOther,
    /// Both are pinned: no geometric fix, velocities get nudged instead.
    Cramming,
}

/// True if a wall correction `inert` already pins a player against moving
/// along `push`.
#[inline]
pub fn is_blocked(inert: Option<Vec2>, push: Vec2) -> bool {
    inert.is_some_and(|inert| angle_diff(inert.angle(), push.angle()).abs() <= FRAC_PI_4)
}

/// Decide how to apply `offset`, the push-out that moves the current player
/// out of the other one.
pub fn classify(own_inert: Option<Vec2>, other_inert: Option<Vec2>, offset: Vec2) -> Resolution {
    match (is_blocked(own_inert, offset), is_blocked(other_inert, -offset)) {
        (false, false) => Resolution::Split,
        (false, true) => Resolution::PushSelf,
        (true, false) => Resolution::PushOther,
        (true, true) => Resolution::Cramming,
    }
}

/// Wall cells touched by the corners of the square at `pos`, closest centre
/// first.
pub fn wall_candidates(pos: Vec2, radius: f64, board: &Board) -> Vec<Aabb> {
    let mut found: Vec<(f64, Aabb)> = Vec::with_capacity(4);
    for (dx, dy) in CORNERS {
        let corner = pos + Vec2::new(dx, dy).scale(radius);
        if !board.is_wall(corner) {
            continue;
        }
        let cell = corner.floor();
        if found.iter().any(|(_, b)| b.min() == cell) {
            continue;
        }
        let tile = Aabb::cell(cell);
        found.push(((tile.center() - pos).length_squared(), tile));
    }
    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    found.into_iter().map(|(_, tile)| tile).collect()
}

/// Push `player` out of nearby walls. Returns the wall correction, or `None`
/// when no wall touched.
pub fn resolve_walls(player: &mut PlayerState, board: &Board, radius: f64) -> Option<Vec2> {
    let before = player.pos;
    for tile in wall_candidates(player.pos, radius, board) {
        if let Some(offset) = tile.push_out(&player.bounding_box(radius)) {
            player.bump(offset);
        }
    }
    let inert = before - player.pos;
    (!inert.is_zero()).then_some(inert)
}

fn bump(players: &mut Store<PlayerState>, id: EntityId, offset: Vec2) {
    if let Some(player) = players.get_mut(id) {
        player.bump(offset);
    }
}

fn nudge(players: &mut Store<PlayerState>, id: EntityId, rng: &mut DeterministicRng, amount: f64) {
    if let Some(player) = players.get_mut(id) {
        let jitter = Vec2::new(rng.next_range(-amount, amount), rng.next_range(-amount, amount));
        player.velocity = player.velocity + jitter;
    }
}

/// Separate player `id` from every other live player.
pub fn resolve_players(
    id: EntityId,
    players: &mut Store<PlayerState>,
    cfg: &PhysicsConfig,
    rng: &mut DeterministicRng,
) {
    let radius = cfg.player_radius;
    let mut cursor = players.cursor();
    while let Some(other_id) = players.advance(&mut cursor) {
        if other_id == id {
            continue;
        }
        let (Some(player), Some(other)) = (players.get(id), players.get(other_id)) else {
            continue;
        };
        let Some(offset) = other.bounding_box(radius).push_out(&player.bounding_box(radius)) else {
            continue;
        };
        match classify(player.inert_collision, other.inert_collision, offset) {
            Resolution::Split => {
                bump(players, id, offset.scale(0.5));
                bump(players, other_id, offset.scale(-0.5));
            }
            Resolution::PushSelf => bump(players, id, offset),
            Resolution::PushOther => bump(players, other_id, -offset),
            Resolution::Cramming => {
                warn!(player = %id, other = %other_id, "cramming");
                nudge(players, id, rng, cfg.cramming_nudge);
                nudge(players, other_id, rng, cfg.cramming_nudge);
            }
        }
    }
}

/// Move player `id` by its velocity over `dt` ms, resolving contacts.
///
/// Sets the player's whole-frame `collision` and returns it.
pub fn integrate(
    id: EntityId,
    dt: f64,
    players: &mut Store<PlayerState>,
    board: &Board,
    cfg: &PhysicsConfig,
    rng: &mut DeterministicRng,
) -> Option<Vec2> {
    let displacement = players.get(id)?.velocity.scale(dt);
    for step in Increments::new(displacement, cfg.player_radius, cfg.max_increments) {
        let player = players.get_mut(id)?;
        player.pos = player.pos + step;
        let origin = player.pos;
        let inert = resolve_walls(player, board, cfg.player_radius);
        player.inert_collision = inert;

        resolve_players(id, players, cfg, rng);

        let player = players.get_mut(id)?;
        let total = origin - player.pos;
        if !total.is_zero() {
            #[cfg(feature = "debug-tracing")]
            trace!(player = %id, correction = %total, "contact");
            player.collision = Some(total);
            return player.collision;
        }
    }
    players.get_mut(id)?.collision = None;
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use crate::game::input::IdleInput;
    use crate::game::state::{PlayerConfig, PlayerHandle};

    fn add_player(players: &mut Store<PlayerState>, pos: Vec2) -> EntityId {
        players.insert_with(|id| {
            let config = Rc::new(PlayerConfig::new("p", Vec2::ZERO, Box::new(IdleInput)));
            let mut state = PlayerState::spawn(PlayerHandle { sim: 0, id }, config, 1.0);
            state.pos = pos;
            state
        })
    }

    fn no_gravity() -> PhysicsConfig {
        PhysicsConfig { gravity: 0.0, ..PhysicsConfig::default() }
    }

    fn open_board() -> Board {
        Board::parse(". . . .\n. . . .\n. . . .").unwrap()
    }

    #[test]
    fn test_classify() {
        let right = Vec2::new(0.1, 0.0);
        assert_eq!(classify(None, None, right), Resolution::Split);
        // Own wall correction points the same way as the push: pinned
        assert_eq!(classify(Some(right), None, right), Resolution::PushOther);
        // Other's wall correction points along the reversed push
        assert_eq!(classify(None, Some(-right), right), Resolution::PushSelf);
        assert_eq!(classify(Some(right), Some(-right), right), Resolution::Cramming);
        // Perpendicular contact does not block
        assert_eq!(classify(Some(Vec2::new(0.0, 0.1)), None, right), Resolution::Split);
    }

    #[test]
    fn test_blocked_band_is_45_degrees() {
        let push = Vec2::RIGHT;
        assert!(is_blocked(Some(Vec2::new(1.0, 0.99)), push));
        assert!(!is_blocked(Some(Vec2::new(1.0, 1.01)), push));
        assert!(!is_blocked(None, push));
    }

    #[test]
    fn test_wall_candidates_sorted_and_deduplicated() {
        let board = Board::parse(". . .\n. . w\nw w w").unwrap();
        // Three corners land in distinct wall cells
        let found = wall_candidates(Vec2::new(1.9, 1.9), 0.25, &board);
        assert_eq!(found.len(), 3);
        let centres: Vec<Vec2> = found.iter().map(Aabb::center).collect();
        let dist: Vec<f64> = centres.iter().map(|c| (*c - Vec2::new(1.9, 1.9)).length_squared()).collect();
        assert!(dist.windows(2).all(|w| w[0] <= w[1]));
        assert!(wall_candidates(Vec2::new(0.5, 0.5), 0.25, &board).is_empty());
    }

    #[test]
    fn test_head_on_split() {
        let board = open_board();
        let mut players = Store::new();
        let a = add_player(&mut players, Vec2::new(1.0, 1.5));
        let b = add_player(&mut players, Vec2::new(1.375, 1.5));
        let mut rng = DeterministicRng::new(1);

        let collision = integrate(a, 0.0, &mut players, &board, &no_gravity(), &mut rng);
        let pa = players.get(a).unwrap().pos;
        let pb = players.get(b).unwrap().pos;
        // Overlap depth 0.125, split evenly
        assert_eq!(pa, Vec2::new(0.9375, 1.5));
        assert_eq!(pb, Vec2::new(1.4375, 1.5));
        assert_eq!(pb.x() - pa.x(), 0.5);
        assert_eq!(collision, Some(Vec2::new(0.0625, 0.0)));
    }

    #[test]
    fn test_floor_contact_zeroes_only_vertical_velocity() {
        let board = Board::parse(". . .\n. . .\nw w w").unwrap();
        let mut players = Store::new();
        let id = add_player(&mut players, Vec2::new(1.5, 1.7));
        let vx = 0.001_234_567_890_123;
        players.get_mut(id).unwrap().velocity = Vec2::new(vx, 0.01);
        let mut rng = DeterministicRng::new(1);

        let collision = integrate(id, 10.0, &mut players, &board, &no_gravity(), &mut rng).unwrap();
        let player = players.get(id).unwrap();
        assert_eq!(player.velocity.x().to_bits(), vx.to_bits());
        assert_eq!(player.velocity.y(), 0.0);
        assert!((player.pos.y() - 1.75).abs() < 1e-12);
        assert!(collision.y() > 0.0 && collision.x() == 0.0);
        assert!(player.inert_collision.is_some());
    }

    #[test]
    fn test_free_flight_clears_collision() {
        let board = open_board();
        let mut players = Store::new();
        let id = add_player(&mut players, Vec2::new(1.5, 1.5));
        {
            let player = players.get_mut(id).unwrap();
            player.velocity = Vec2::new(0.01, 0.0);
            player.collision = Some(Vec2::new(0.0, 0.1));
        }
        let mut rng = DeterministicRng::new(1);
        assert_eq!(integrate(id, 10.0, &mut players, &board, &no_gravity(), &mut rng), None);
        let player = players.get(id).unwrap();
        assert!(player.collision.is_none());
        assert!(player.inert_collision.is_none());
        assert!((player.pos.x() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_fast_body_does_not_tunnel() {
        // One-tile wall column; a 3-tile jump in a single frame must stop at it
        let board = Board::parse(". . . w . . .\n. . . w . . .").unwrap();
        let mut players = Store::new();
        let id = add_player(&mut players, Vec2::new(1.5, 0.5));
        players.get_mut(id).unwrap().velocity = Vec2::new(0.3, 0.0);
        let mut rng = DeterministicRng::new(1);

        integrate(id, 10.0, &mut players, &board, &no_gravity(), &mut rng);
        let player = players.get(id).unwrap();
        assert!(player.pos.x() <= 2.75 + 1e-12, "tunneled to {}", player.pos);
        assert_eq!(player.velocity.x(), 0.0);
    }

    #[test]
    fn test_pinned_player_pushes_other_fully() {
        let board = Board::parse(". . . w\n. . . w\n. . . w").unwrap();
        let mut players = Store::new();
        let a = add_player(&mut players, Vec2::new(2.7, 1.5));
        let b = add_player(&mut players, Vec2::new(2.4, 1.5));
        players.get_mut(a).unwrap().velocity = Vec2::new(0.01, 0.0);
        let mut rng = DeterministicRng::new(1);

        integrate(a, 10.0, &mut players, &board, &no_gravity(), &mut rng);
        let pa = players.get(a).unwrap().pos;
        let pb = players.get(b).unwrap().pos;
        // A is held by the wall at x = 3, B absorbs the whole overlap
        assert!((pa.x() - 2.75).abs() < 1e-12);
        assert!((pa.x() - pb.x() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cramming_nudges_velocities_only() {
        let board = Board::parse(". . . w\n. . . w\n. . . w").unwrap();
        let mut players = Store::new();
        let a = add_player(&mut players, Vec2::new(2.7, 1.5));
        let b = add_player(&mut players, Vec2::new(2.4, 1.5));
        players.get_mut(a).unwrap().velocity = Vec2::new(0.01, 0.0);
        players.get_mut(b).unwrap().inert_collision = Some(Vec2::new(-0.05, 0.0));
        let cfg = no_gravity();
        let mut rng = DeterministicRng::new(1);

        integrate(a, 10.0, &mut players, &board, &cfg, &mut rng);
        let pa = players.get(a).unwrap();
        let pb = players.get(b).unwrap();
        assert_eq!(pb.pos, Vec2::new(2.4, 1.5));
        assert!((pa.pos.x() - 2.75).abs() < 1e-12);
        assert!(pb.velocity.x().abs() <= cfg.cramming_nudge);
        assert!(pb.velocity.y().abs() <= cfg.cramming_nudge);
        assert!(!pb.velocity.is_zero());
        assert!(pa.velocity.x().abs() <= cfg.cramming_nudge);
    }
}
