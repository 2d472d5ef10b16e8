//! Geometry kernel: vector helpers on top of `bevy::math`.
//!
//! World space is Z-up. "Horizontal" everywhere in the engine means the X-Y
//! plane, so radar bearings and FOV cones ignore height differences.
//!
//! ВАЖНО: ни одна функция здесь не возвращает NaN/Inf. Вырожденные входы
//! (нулевая длина) дают `None` или ноль.

use bevy::math::{Vec2, Vec3};

/// Vertical axis of the host world.
pub const UP: Vec3 = Vec3::Z;

/// Magnitudes below this are treated as zero.
pub const EPSILON: f32 = 1.0e-6;

pub fn cross_product(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// Left/right split used for polar radar placement.
///
/// True iff `dot(cross(base, UP), v) < 0`. The sign convention is the host's
/// and is kept as-is so radar dots land on the expected side.
pub fn is_right_of(base: Vec3, v: Vec3) -> bool {
    cross_product(base, UP).dot(v) < 0.0
}

/// `v` projected onto the horizontal plane.
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

/// Angle (radians, `[0, π]`) between `a` and `b` on the horizontal plane.
///
/// `None` when either vector has no horizontal extent.
pub fn angle_between(a: Vec3, b: Vec3) -> Option<f32> {
    let a = horizontal(a);
    let b = horizontal(b);

    let denom = a.length() * b.length();
    if denom < EPSILON || !denom.is_finite() {
        return None;
    }

    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Unit vector along `v`, or `None` for (near) zero / non-finite input.
pub fn safe_normalize(v: Vec3) -> Option<Vec3> {
    let length = v.length();
    if length < EPSILON || !length.is_finite() {
        return None;
    }
    Some(v / length)
}

/// 2-D dot product of the horizontal components.
pub fn horizontal_dot(a: Vec3, b: Vec3) -> f32 {
    a.x * b.x + a.y * b.y
}

pub fn is_finite_vec3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

pub fn is_finite_vec2(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
