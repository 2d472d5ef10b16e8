//! World → screen projection.
//!
//! The host owns the camera. Whenever its transform changes the feed pushes a
//! fresh `CameraProjection` into the engine; everything that needs screen
//! coordinates goes through the `ProjectionProvider` trait so tests can stub
//! it out.

use bevy::math::{Mat4, Vec2, Vec3, Vec4};

use crate::math::{self, EPSILON};

/// Viewport rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height.abs() < EPSILON {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// Result of projecting one world point.
///
/// `valid == false` means "do not draw, do not target": the point is behind
/// the camera or past the far plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenProjection {
    pub point: Vec2,
    /// Window depth; valid projections lie in `[0, 1]`.
    pub depth: f32,
    pub valid: bool,
}

impl ScreenProjection {
    pub const INVALID: ScreenProjection = ScreenProjection {
        point: Vec2::ZERO,
        depth: 0.0,
        valid: false,
    };

    pub fn visible(point: Vec2, depth: f32) -> Self {
        Self {
            point,
            depth,
            valid: true,
        }
    }

    /// Screen point if the projection is usable.
    pub fn point(&self) -> Option<Vec2> {
        self.valid.then_some(self.point)
    }
}

pub trait ProjectionProvider: Send + Sync {
    fn project(&self, world: Vec3) -> ScreenProjection;

    /// Crosshair position.
    fn screen_center(&self) -> Vec2;
}

/// View + projection matrices and viewport, gluProject-style (OpenGL clip
/// space, window origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjection {
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: Viewport,
}

impl CameraProjection {
    pub fn new(view: Mat4, projection: Mat4, viewport: Viewport) -> Self {
        Self {
            view,
            projection,
            viewport,
        }
    }

    /// Perspective camera at `eye` looking at `target`, Z-up.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, viewport: Viewport, near: f32, far: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, math::UP);
        let projection = Mat4::perspective_rh_gl(fov_y_radians, viewport.aspect_ratio(), near, far);
        Self::new(view, projection, viewport)
    }

    /// Camera placed at `eye` looking along `forward`.
    pub fn first_person(eye: Vec3, forward: Vec3, fov_y_radians: f32, viewport: Viewport) -> Self {
        let direction = math::safe_normalize(forward).unwrap_or(Vec3::Y);
        Self::look_at(eye, eye + direction, fov_y_radians, viewport, 0.1, 10_000.0)
    }
}

impl ProjectionProvider for CameraProjection {
    fn project(&self, world: Vec3) -> ScreenProjection {
        let clip: Vec4 = self.projection * (self.view * world.extend(1.0));

        // w <= 0: точка позади камеры
        if !(clip.w > EPSILON) || !clip.is_finite() {
            return ScreenProjection::INVALID;
        }

        let ndc = clip.truncate() / clip.w;
        let depth = (ndc.z + 1.0) * 0.5;
        if !(0.0..=1.0).contains(&depth) {
            return ScreenProjection::INVALID;
        }

        let point = Vec2::new(
            self.viewport.x + (ndc.x + 1.0) * 0.5 * self.viewport.width,
            self.viewport.y + (ndc.y + 1.0) * 0.5 * self.viewport.height,
        );
        if !math::is_finite_vec2(point) {
            return ScreenProjection::INVALID;
        }

        ScreenProjection::visible(point, depth)
    }

    fn screen_center(&self) -> Vec2 {
        self.viewport.center()
    }
}
