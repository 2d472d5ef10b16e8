//! Line-of-sight oracle contract.
//!
//! The host's collision world answers ray casts; the engine only needs to know
//! what category of object a ray struck first.

use bevy::math::Vec3;

/// Collision filter passed through to the host's ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RayMask(pub u32);

impl RayMask {
    pub const ALL: RayMask = RayMask(u32::MAX);
}

/// Category of the first object a ray struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Player,
    Terrain,
    Static,
    Vehicle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RayHit {
    Miss,
    Hit(ObjectCategory),
}

pub trait LineOfSightOracle: Send + Sync {
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: RayMask) -> RayHit;
}

/// Nothing ever blocks the view; every ray ends on its target player.
///
/// Useful for hosts without collision data and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFieldOracle;

impl LineOfSightOracle for OpenFieldOracle {
    fn cast_ray(&self, _from: Vec3, _to: Vec3, _mask: RayMask) -> RayHit {
        RayHit::Hit(ObjectCategory::Player)
    }
}

impl<F> LineOfSightOracle for F
where
    F: Fn(Vec3, Vec3, RayMask) -> RayHit + Send + Sync,
{
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: RayMask) -> RayHit {
        self(from, to, mask)
    }
}
