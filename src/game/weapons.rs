//! Weapons
//!
//! Gun, bullet and shield, all built on the generic entity contract. A
//! player gets weapons through a spawn hook from [`loadout`]; the hook's
//! cleanup destroys them when the player is eliminated.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::aabb::Aabb;
use crate::core::vec2::Vec2;
use crate::game::entity::Entity;
use crate::game::simulation::Simulation;
use crate::game::state::{Cleanup, EntityHandle, PlayerConfig, PlayerHandle, SpawnHook};
use crate::game::surface::Surface;

/// Gun and bullet tuning. Times in ms, speeds in tiles per ms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunSpec {
    /// Bullet speed relative to the shooter
    pub bullet_speed: f64,
    /// Minimum time between shots
    pub shot_time: f64,
    /// Shots per clip
    pub clip_size: u32,
    /// Time to refill an empty clip
    pub reload_time: f64,
    /// Half-extent of a bullet
    pub bullet_radius: f64,
    /// Speed change applied to shooter and target
    pub knockback: f64,
    /// Damage per hit
    pub damage: f64,
}

impl Default for GunSpec {
    fn default() -> Self {
        Self {
            bullet_speed: 0.04,
            shot_time: 300.0,
            clip_size: 6,
            reload_time: 1000.0,
            bullet_radius: 0.05,
            knockback: 0.005,
            damage: 0.3,
        }
    }
}

// =============================================================================
// GUN
// =============================================================================

/// Fires a bullet along the owner's heading while the trigger is held.
pub struct Gun {
    owner: PlayerHandle,
    config: Rc<PlayerConfig>,
    trigger: String,
    spec: GunSpec,
    since_last_shot: f64,
    clip: u32,
    reload_left: Option<f64>,
}

impl Gun {
    /// Registry id
    pub const ID: &'static str = "BasicGun";

    /// Gun for `owner`, fired by the switch named `trigger`.
    pub fn new(owner: PlayerHandle, config: Rc<PlayerConfig>, trigger: &str, spec: GunSpec) -> Self {
        let clip = spec.clip_size;
        Self {
            owner,
            config,
            trigger: trigger.to_string(),
            spec,
            since_last_shot: 0.0,
            clip,
            reload_left: None,
        }
    }

    /// Shots left in the clip.
    pub fn clip(&self) -> u32 {
        self.clip
    }

    fn reload(&mut self, dt: f64) {
        if let Some(left) = self.reload_left {
            let left = left - dt;
            if left <= 0.0 {
                self.clip = self.spec.clip_size;
                self.reload_left = None;
            } else {
                self.reload_left = Some(left);
            }
        }
    }

    fn shoot(&mut self, sim: &mut Simulation) {
        let radius = sim.physics().player_radius;
        let Some(owner) = sim.player_mut(self.owner) else {
            return;
        };
        let heading = self.config.move_set.heading_input().normalize();
        let velocity = heading.scale(self.spec.bullet_speed) + owner.velocity;
        owner.velocity = owner.velocity + heading.scale(-self.spec.knockback);
        let pos = owner.pos + heading.scale(self.spec.bullet_radius + radius + 0.01);

        self.since_last_shot = 0.0;
        self.clip -= 1;
        if self.clip == 0 {
            self.reload_left = Some(self.spec.reload_time);
        }
        sim.create_entity(Bullet {
            owner: self.owner,
            fired_by: Rc::clone(&self.config),
            pos,
            velocity,
            radius: self.spec.bullet_radius,
            knockback: self.spec.knockback,
            damage: self.spec.damage,
        });
    }
}

impl Entity for Gun {
    fn tick(&mut self, _handle: EntityHandle, sim: &mut Simulation, dt: f64) {
        self.since_last_shot += dt;
        self.reload(dt);
        if self.clip == 0
            || self.since_last_shot <= self.spec.shot_time
            || !self.config.move_set.switch(&self.trigger)
        {
            return;
        }
        self.shoot(sim);
    }
}

// =============================================================================
// BULLET
// =============================================================================

/// Projectile. Flies straight until it leaves the play area, hits a wall or
/// hits a player other than whoever fired it.
pub struct Bullet {
    owner: PlayerHandle,
    fired_by: Rc<PlayerConfig>,
    pos: Vec2,
    velocity: Vec2,
    radius: f64,
    knockback: f64,
    damage: f64,
}

impl Bullet {
    /// Current position.
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    fn hit(&self, handle: EntityHandle, target: PlayerHandle, sim: &mut Simulation) {
        if let Err(err) = sim.damage(target, self.damage, Some(self.owner)) {
            warn!(%err, "bullet hit rejected");
        }
        if let Some(player) = sim.player_mut(target) {
            if !player.invulnerable {
                player.velocity = player.velocity + self.velocity.normalize().scale(self.knockback);
            }
        }
        sim.destroy_entity(handle);
    }
}

impl Entity for Bullet {
    fn tick(&mut self, handle: EntityHandle, sim: &mut Simulation, dt: f64) {
        if !sim.play_area().contains(self.pos) || sim.board().is_wall(self.pos) {
            sim.destroy_entity(handle);
            return;
        }
        let radius = sim.physics().player_radius;
        let collider = Aabb::square(self.pos, self.radius);
        let target = sim
            .players()
            .find(|p| !Rc::ptr_eq(p.config(), &self.fired_by) && p.bounding_box(radius).overlaps(&collider))
            .map(|p| p.handle());
        if let Some(target) = target {
            self.hit(handle, target, sim);
            return;
        }
        self.pos = self.pos + self.velocity.scale(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_box(Aabb::square(self.pos, self.radius), &self.fired_by.color);
    }
}

// =============================================================================
// SHIELD
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
enum ShieldPhase {
    Ready,
    Raised { left: f64 },
    CoolingDown { left: f64 },
}

/// Makes the owner invulnerable for a short time, then cools down.
pub struct Shield {
    owner: PlayerHandle,
    config: Rc<PlayerConfig>,
    trigger: String,
    up_time: f64,
    cooldown: f64,
    /// Outer size of the drawn ring relative to the player square
    scale: f64,
    phase: ShieldPhase,
    /// Owner square at the last tick, for drawing
    drawn_at: Option<Aabb>,
}

impl Shield {
    /// Registry id
    pub const ID: &'static str = "Shield";

    /// Shield raised by the switch named `trigger`: 500 ms up, 1500 ms cooldown.
    pub fn new(owner: PlayerHandle, config: Rc<PlayerConfig>, trigger: &str) -> Self {
        Self {
            owner,
            config,
            trigger: trigger.to_string(),
            up_time: 500.0,
            cooldown: 1500.0,
            scale: 1.2,
            phase: ShieldPhase::Ready,
            drawn_at: None,
        }
    }

    /// True while the shield is up.
    pub fn is_raised(&self) -> bool {
        matches!(self.phase, ShieldPhase::Raised { .. })
    }

    fn set_invulnerable(&self, sim: &mut Simulation, value: bool) {
        if let Some(owner) = sim.player_mut(self.owner) {
            owner.invulnerable = value;
        }
    }
}

impl Entity for Shield {
    fn tick(&mut self, _handle: EntityHandle, sim: &mut Simulation, dt: f64) {
        self.phase = match self.phase {
            ShieldPhase::Ready if self.config.move_set.switch(&self.trigger) => {
                self.set_invulnerable(sim, true);
                ShieldPhase::Raised { left: self.up_time }
            }
            ShieldPhase::Ready => ShieldPhase::Ready,
            ShieldPhase::Raised { left } if left - dt <= 0.0 => {
                self.set_invulnerable(sim, false);
                // Overshoot counts toward the cooldown
                ShieldPhase::CoolingDown { left: self.cooldown + (left - dt) }
            }
            ShieldPhase::Raised { left } => ShieldPhase::Raised { left: left - dt },
            ShieldPhase::CoolingDown { left } if left - dt <= 0.0 => ShieldPhase::Ready,
            ShieldPhase::CoolingDown { left } => ShieldPhase::CoolingDown { left: left - dt },
        };
        let radius = sim.physics().player_radius;
        self.drawn_at = sim.player(self.owner).map(|p| p.bounding_box(radius));
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let (true, Some(inner)) = (self.is_raised(), self.drawn_at) else {
            return;
        };
        let outer = Aabb::square(inner.center(), inner.width() * 0.5 * self.scale);
        let color = &self.config.color_light;
        // Ring as four strips around the player square
        surface.fill_box(Aabb::new(outer.min(), Vec2::new(outer.max().x(), inner.min().y())), color);
        surface.fill_box(Aabb::new(Vec2::new(outer.min().x(), inner.max().y()), outer.max()), color);
        surface.fill_box(
            Aabb::new(Vec2::new(outer.min().x(), inner.min().y()), Vec2::new(inner.min().x(), inner.max().y())),
            color,
        );
        surface.fill_box(
            Aabb::new(Vec2::new(inner.max().x(), inner.min().y()), Vec2::new(outer.max().x(), inner.max().y())),
            color,
        );
    }
}

// =============================================================================
// LOADOUT
// =============================================================================

/// Weapon variants, identified by a string id for saved configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    /// [`Gun`] with default tuning
    Gun,
    /// [`Shield`]
    Shield,
}

impl WeaponKind {
    /// Every variant.
    pub const ALL: [WeaponKind; 2] = [WeaponKind::Gun, WeaponKind::Shield];

    /// String id.
    pub fn id(self) -> &'static str {
        match self {
            WeaponKind::Gun => Gun::ID,
            WeaponKind::Shield => Shield::ID,
        }
    }

    /// Look up a variant by id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Create this weapon for a live `owner`. Returns `None` if the owner is gone.
    pub fn equip(self, owner: PlayerHandle, trigger: &str, sim: &mut Simulation) -> Option<EntityHandle> {
        let config = Rc::clone(sim.player(owner)?.config());
        let handle = match self {
            WeaponKind::Gun => sim.create_entity(Gun::new(owner, config, trigger, GunSpec::default())),
            WeaponKind::Shield => sim.create_entity(Shield::new(owner, config, trigger)),
        };
        debug!(player = %owner.id(), weapon = self.id(), trigger, "weapon equipped");
        Some(handle)
    }
}

/// Spawn hook equipping each `(weapon, trigger)` pair and destroying the
/// weapons again on elimination.
pub fn loadout(weapons: Vec<(WeaponKind, String)>) -> SpawnHook {
    Box::new(move |owner: PlayerHandle, sim: &mut Simulation| -> Option<Cleanup> {
        let equipped: Vec<EntityHandle> = weapons
            .iter()
            .filter_map(|(kind, trigger)| kind.equip(owner, trigger, sim))
            .collect();
        Some(Box::new(move |sim: &mut Simulation| {
            for handle in equipped {
                sim.destroy_entity(handle);
            }
        }))
    })
}
