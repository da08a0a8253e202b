//! Player State
//!
//! A player is split in two: a [`PlayerConfig`] that survives respawns and is
//! shared through an `Rc`, and a [`PlayerState`] that is created fresh at
//! every spawn and dropped on elimination.

use std::fmt;
use std::rc::Rc;

use crate::core::aabb::Aabb;
use crate::core::store::EntityId;
use crate::core::vec2::Vec2;
use crate::game::input::MoveSet;
use crate::game::simulation::Simulation;

/// Teardown registered by a spawn hook, run once when the player is eliminated.
pub type Cleanup = Box<dyn FnOnce(&mut Simulation)>;

/// Called right after a player spawns. Typically creates weapon entities and
/// returns a cleanup that destroys them.
pub type SpawnHook = Box<dyn Fn(PlayerHandle, &mut Simulation) -> Option<Cleanup>>;

/// Reference to a live or former player of a specific simulation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlayerHandle {
    pub(crate) sim: u64,
    pub(crate) id: EntityId,
}

impl PlayerHandle {
    /// Player id within its simulation.
    pub fn id(self) -> EntityId {
        self.id
    }

    /// Id of the owning simulation.
    pub fn simulation_id(self) -> u64 {
        self.sim
    }
}

impl fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {} of sim {}", self.id, self.sim)
    }
}

/// Reference to a generic entity of a specific simulation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityHandle {
    pub(crate) sim: u64,
    pub(crate) id: EntityId,
}

impl EntityHandle {
    /// Entity id within its simulation.
    pub fn id(self) -> EntityId {
        self.id
    }
}

/// Static description of a player, reused across respawns.
pub struct PlayerConfig {
    /// Display name, used in logs and by game modes
    pub name: String,
    /// Primary colour: health fill, heading marker, bullets
    pub color: String,
    /// Colour of lost health
    pub color_mid: String,
    /// Highlight colour, used for shields
    pub color_light: String,
    /// Spawn point; the player appears centred half a tile up-left of it
    pub start: Vec2,
    /// Input source
    pub move_set: Box<dyn MoveSet>,
    on_spawn: Option<SpawnHook>,
}

impl PlayerConfig {
    /// Config with grey colours and no spawn hook.
    pub fn new(name: impl Into<String>, start: Vec2, move_set: Box<dyn MoveSet>) -> Self {
        Self {
            name: name.into(),
            color: "#888".to_string(),
            color_mid: "#555".to_string(),
            color_light: "#ccc".to_string(),
            start,
            move_set,
            on_spawn: None,
        }
    }

    /// Set the three colours.
    pub fn with_colors(mut self, color: &str, color_mid: &str, color_light: &str) -> Self {
        self.color = color.to_string();
        self.color_mid = color_mid.to_string();
        self.color_light = color_light.to_string();
        self
    }

    /// Install the hook run at every spawn.
    pub fn with_on_spawn(mut self, hook: SpawnHook) -> Self {
        self.on_spawn = Some(hook);
        self
    }

    pub(crate) fn on_spawn(&self) -> Option<&SpawnHook> {
        self.on_spawn.as_ref()
    }
}

impl fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("move_set", &self.move_set.variant())
            .field("on_spawn", &self.on_spawn.is_some())
            .finish()
    }
}

/// Per-life state of a player.
pub struct PlayerState {
    /// Centre position
    pub pos: Vec2,
    /// Velocity in tiles per ms
    pub velocity: Vec2,
    /// Velocity at the start of the last update
    pub prev_velocity: Vec2,
    /// Hit points; eliminated at or below zero
    pub hp: f64,
    /// Damage is ignored while set
    pub invulnerable: bool,
    /// Wall correction from the most recent increment, absent without wall contact
    pub inert_collision: Option<Vec2>,
    /// Net correction of the frame where motion was arrested, absent if none
    pub collision: Option<Vec2>,
    handle: PlayerHandle,
    config: Rc<PlayerConfig>,
    on_death: Option<Cleanup>,
}

impl PlayerState {
    pub(crate) fn spawn(handle: PlayerHandle, config: Rc<PlayerConfig>, hp: f64) -> Self {
        Self {
            pos: config.start - Vec2::diag(0.5),
            velocity: Vec2::ZERO,
            prev_velocity: Vec2::ZERO,
            hp,
            invulnerable: false,
            inert_collision: None,
            collision: None,
            handle,
            config,
            on_death: None,
        }
    }

    /// Handle for this player.
    pub fn handle(&self) -> PlayerHandle {
        self.handle
    }

    /// Shared configuration.
    pub fn config(&self) -> &Rc<PlayerConfig> {
        &self.config
    }

    /// Collision square of half-extent `radius`.
    pub fn bounding_box(&self, radius: f64) -> Aabb {
        Aabb::square(self.pos, radius)
    }

    /// Translate by `offset` and drop velocity pointing back into whatever pushed.
    pub fn bump(&mut self, offset: Vec2) {
        self.pos = self.pos + offset;
        self.velocity = crate::core::aabb::bump_adjust_velocity(offset, self.velocity);
    }

    pub(crate) fn set_on_death(&mut self, cleanup: Option<Cleanup>) {
        self.on_death = cleanup;
    }

    pub(crate) fn take_on_death(&mut self) -> Option<Cleanup> {
        self.on_death.take()
    }
}

impl fmt::Debug for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerState")
            .field("name", &self.config.name)
            .field("id", &self.handle.id)
            .field("pos", &self.pos)
            .field("velocity", &self.velocity)
            .field("hp", &self.hp)
            .field("collision", &self.collision)
            .finish()
    }
}
