//! Entity snapshot model: value copies of what the feed saw this tick.
//!
//! Nothing here points back into the host. `EntityHandle` is an opaque id the
//! feed hands out; the engine only ever compares handles.

use bevy::math::Vec3;
use bevy::reflect::Reflect;

use crate::math;

pub mod weapon;

pub use weapon::{Weapon, WeaponKind};

/// Team id of an actor that has not been assigned to a team.
pub const UNASSIGNED_TEAM: i32 = -1;

/// Opaque identity of a host game object.
///
/// Owned by the entity feed. Equal handles within one session refer to the
/// same object; that is the only thing the engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct EntityHandle(pub u64);

/// Kinematic state shared by everything the feed reports.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Actor {
    pub team_id: i32,
    /// Center of mass.
    pub position: Vec3,
    /// Pitch, roll, yaw (radians).
    pub orientation: Vec3,
    pub velocity: Vec3,
    /// Unit-length while the owning player is valid.
    pub forward: Vec3,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            team_id: UNASSIGNED_TEAM,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            forward: Vec3::Y,
        }
    }
}

impl Actor {
    pub fn is_same_team(&self, other: &Actor) -> bool {
        self.team_id == other.team_id
    }
}

/// A tracked player (local or remote) as observed this tick.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Player {
    pub actor: Actor,
    pub identity: EntityHandle,
    pub player_id: i32,
    pub health: f32,
    pub weapon: Weapon,
    pub weapon_kind: WeaponKind,
    /// Aim origin (head), distinct from `actor.position`.
    pub eye_position: Vec3,
    /// Alive and tracked this tick.
    pub valid: bool,
    pub name: String,
}

impl Player {
    /// Valid player standing at `position`, facing +Y, eye at the center.
    pub fn new(identity: EntityHandle, team_id: i32, position: Vec3) -> Self {
        Self {
            actor: Actor {
                team_id,
                position,
                ..Actor::default()
            },
            identity,
            player_id: -1,
            health: 1.0,
            weapon: Weapon::None,
            weapon_kind: WeaponKind::Hitscan,
            eye_position: position,
            valid: true,
            name: String::new(),
        }
    }

    /// Placeholder for "nobody observed yet".
    pub fn invalid(identity: EntityHandle) -> Self {
        Self {
            valid: false,
            ..Self::new(identity, UNASSIGNED_TEAM, Vec3::ZERO)
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.actor.velocity = velocity;
        self
    }

    /// Sets the facing direction. A degenerate vector invalidates the record
    /// so the unit-forward invariant always holds for valid players.
    pub fn with_forward(mut self, forward: Vec3) -> Self {
        match math::safe_normalize(forward) {
            Some(unit) => self.actor.forward = unit,
            None => self.valid = false,
        }
        self
    }

    pub fn with_orientation(mut self, orientation: Vec3) -> Self {
        self.actor.orientation = orientation;
        self
    }

    /// Eye placed `height` above the center of mass.
    pub fn with_eye_height(mut self, height: f32) -> Self {
        self.eye_position = self.actor.position + math::UP * height;
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon, weapon_kind: WeaponKind) -> Self {
        self.weapon = weapon;
        self.weapon_kind = weapon_kind;
        self
    }

    /// Equip by resource name (see `Weapon::from_resource_name`).
    pub fn with_weapon_resource(self, resource_name: &str) -> Self {
        let (weapon, kind) = Weapon::from_resource_name(resource_name);
        self.with_weapon(weapon, kind)
    }

    pub fn with_player_id(mut self, player_id: i32) -> Self {
        self.player_id = player_id;
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.actor.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.actor.velocity
    }

    pub fn forward(&self) -> Vec3 {
        self.actor.forward
    }

    pub fn is_same_team(&self, other: &Player) -> bool {
        self.actor.is_same_team(&other.actor)
    }

    /// Half of the standing height (eye sits on top, center in the middle).
    pub fn half_height(&self) -> f32 {
        self.eye_position.z - self.actor.position.z
    }
}

/// Everything the feed reported for one game tick.
///
/// Cleared and rebuilt every tick, never patched in place across ticks.
#[derive(Debug, Clone)]
pub struct Roster {
    pub local: Player,
    pub others: Vec<Player>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            local: Player::invalid(EntityHandle(0)),
            others: Vec::new(),
        }
    }
}

impl Roster {
    pub fn new(local: Player, others: Vec<Player>) -> Self {
        Self { local, others }
    }

    /// Start of a tick: local player invalid until repopulated, others empty.
    pub fn clear(&mut self) {
        self.local.valid = false;
        self.others.clear();
    }

    pub fn set_local(&mut self, local: Player) {
        self.local = local;
    }

    /// Append an observed entity. The local player is never duplicated into
    /// `others`.
    pub fn push(&mut self, player: Player) {
        if self.local.valid && player.identity == self.local.identity {
            return;
        }
        self.others.push(player);
    }

    /// Look up a remote player by identity.
    pub fn find(&self, identity: EntityHandle) -> Option<&Player> {
        self.others.iter().find(|p| p.identity == identity)
    }

    /// Valid remote players in roster order (self excluded).
    pub fn candidates(&self) -> impl Iterator<Item = &Player> {
        let local = self.local.identity;
        self.others
            .iter()
            .filter(move |p| p.valid && p.identity != local)
    }

    pub fn len(&self) -> usize {
        self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.others.is_empty()
    }
}
