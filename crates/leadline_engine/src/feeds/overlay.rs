//! Bounding-box overlay (ESP) entries.

use bevy::math::Vec2;

use crate::config::OverlayConfig;
use crate::math;
use crate::projection::ProjectionProvider;
use crate::snapshot::{EntityHandle, Player, Roster};
use crate::visibility;

/// One box to draw. `center` is the projected center of mass, the box spans
/// `height` up and down from it (the head sits half a body above the center).
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    pub identity: EntityHandle,
    pub center: Vec2,
    pub height: f32,
    pub width: f32,
    pub friendly: bool,
    pub name: String,
    pub distance: f32,
}

impl OverlayEntry {
    pub fn is_finite(&self) -> bool {
        math::is_finite_vec2(self.center)
            && self.height.is_finite()
            && self.width.is_finite()
            && self.distance.is_finite()
    }
}

/// Screen-space half height of `player`: distance between the projected
/// center and the projected point raised by `eye.z - position.z`.
///
/// `None` when either point does not project.
pub fn apparent_height(projector: &dyn ProjectionProvider, player: &Player) -> Option<f32> {
    let center = projector.project(player.position()).point()?;
    let head = projector
        .project(player.position() + math::UP * player.half_height())
        .point()?;
    let height = (head.y - center.y).abs();
    height.is_finite().then_some(height)
}

pub fn build_overlay(roster: &Roster, config: &OverlayConfig, projector: &dyn ProjectionProvider) -> Vec<OverlayEntry> {
    let local = &roster.local;
    let mut entries = Vec::new();

    for player in roster.candidates() {
        let friendly = local.is_same_team(player);
        if friendly && !config.show_friendlies {
            continue;
        }
        if !visibility::in_field_of_view(local, player.position()) {
            continue;
        }

        let Some(center) = projector.project(player.position()).point() else {
            continue;
        };
        let Some(height) = apparent_height(projector, player) else {
            continue;
        };

        let entry = OverlayEntry {
            identity: player.identity,
            center,
            height,
            width: config.width_to_height_ratio * height,
            friendly,
            name: player.name.clone(),
            distance: local.position().distance(player.position()),
        };
        if entry.is_finite() {
            entries.push(entry);
        }
    }

    entries
}
