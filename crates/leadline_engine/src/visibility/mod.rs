//! Visibility & framing filters.
//!
//! Cheap geometric gates run before anything touches the projection or the
//! collision world:
//! - `in_field_of_view`: front half-space (horizontal dot > 0), no angle bound
//! - `in_horizontal_fov`: cone of ±angle around forward, horizontal plane only
//! - `has_line_of_sight`: one ray through the host oracle

use bevy::math::Vec3;

use crate::math::{self, EPSILON};
use crate::snapshot::Player;

pub mod line_of_sight;

pub use line_of_sight::{LineOfSightOracle, ObjectCategory, OpenFieldOracle, RayHit, RayMask};

/// Ray start is pushed this far along the shooter's forward vector so the
/// shooter's own hull does not stop it.
pub const LOS_START_OFFSET: f32 = 4.0;

/// True iff `target_pos` lies in front of `local` on the horizontal plane.
pub fn in_field_of_view(local: &Player, target_pos: Vec3) -> bool {
    let delta = target_pos - local.position();
    math::horizontal_dot(local.forward(), delta) > 0.0
}

/// Horizontal cone test: the angle between forward and the line to the target
/// is within `±angle_degrees`.
///
/// The cone check compares squares (`dot² / (|f|²·|d|²) >= cos²θ`) which loses
/// the sign, so the half-space test always runs first. From 90° up the cone
/// covers the whole front half-space.
pub fn in_horizontal_fov(local: &Player, target_pos: Vec3, angle_degrees: f32) -> bool {
    let forward = local.forward();
    let delta = target_pos - local.position();

    let dot = math::horizontal_dot(forward, delta);
    if !(dot > 0.0) {
        return false;
    }

    if angle_degrees >= 90.0 {
        return true;
    }

    let denom = math::horizontal_dot(forward, forward) * math::horizontal_dot(delta, delta);
    if !(denom > EPSILON) || !denom.is_finite() {
        return false;
    }

    let cos = angle_degrees.to_radians().cos();
    (dot * dot) / denom >= cos * cos
}

/// Unobstructed ray from just in front of the shooter's eye to the target's
/// center. Anything other than a player-category hit counts as blocked.
pub fn has_line_of_sight(oracle: &dyn LineOfSightOracle, shooter: &Player, target: &Player) -> bool {
    let start = shooter.eye_position + shooter.forward() * LOS_START_OFFSET;
    matches!(
        oracle.cast_ray(start, target.position(), RayMask::ALL),
        RayHit::Hit(ObjectCategory::Player)
    )
}
