//! Flat-world line of sight: axis-aligned wall boxes on the ground plane.

use bevy::math::{Vec2, Vec3};
use leadline_engine::{LineOfSightOracle, ObjectCategory, RayHit, RayMask};

#[derive(Debug, Clone, Copy)]
pub struct Wall {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
}

impl Wall {
    /// Slab test of the segment `from → to` against the box, 2-D first,
    /// then the height of the segment where it enters the box.
    fn blocks(&self, from: Vec3, to: Vec3) -> bool {
        let origin = from.truncate();
        let delta = (to - from).truncate();

        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;
        for axis in 0..2 {
            let (o, d) = (origin[axis], delta[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1.0e-6 {
                if o < lo || o > hi {
                    return false;
                }
                continue;
            }
            let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return false;
            }
        }

        let z_enter = from.z + (to.z - from.z) * t_enter;
        let z_exit = from.z + (to.z - from.z) * t_exit;
        z_enter.min(z_exit) <= self.height
    }
}

#[derive(Debug, Clone, Default)]
pub struct WallOracle {
    pub walls: Vec<Wall>,
}

impl LineOfSightOracle for WallOracle {
    fn cast_ray(&self, from: Vec3, to: Vec3, _mask: RayMask) -> RayHit {
        if self.walls.iter().any(|wall| wall.blocks(from, to)) {
            RayHit::Hit(ObjectCategory::Terrain)
        } else {
            // Ничего не мешает → луч доходит до игрока
            RayHit::Hit(ObjectCategory::Player)
        }
    }
}
