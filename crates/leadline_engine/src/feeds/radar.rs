//! Radar blips in polar form around the local player.

use crate::config::RadarConfig;
use crate::math;
use crate::snapshot::{EntityHandle, Roster};

/// Polar position relative to the local player's facing.
///
/// `bearing` is the unsigned horizontal angle (radians) between forward and
/// the line to the player; `right` tells which side it is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarBlip {
    pub identity: EntityHandle,
    pub range: f32,
    pub bearing: f32,
    pub right: bool,
    pub friendly: bool,
}

impl RadarBlip {
    pub fn is_finite(&self) -> bool {
        self.range.is_finite() && self.bearing.is_finite()
    }
}

pub fn build_radar(roster: &Roster, config: &RadarConfig) -> Vec<RadarBlip> {
    let local = &roster.local;
    let forward = local.forward();
    let mut blips = Vec::new();

    for player in roster.candidates() {
        let friendly = local.is_same_team(player);
        if friendly && !config.show_friendlies {
            continue;
        }

        let delta = player.position() - local.position();
        let range = delta.length();
        if let Some(max_range) = config.max_range {
            if range > max_range {
                continue;
            }
        }

        let blip = RadarBlip {
            identity: player.identity,
            range,
            bearing: math::angle_between(forward, delta).unwrap_or(0.0),
            right: math::is_right_of(forward, delta),
            friendly,
        };
        if blip.is_finite() {
            blips.push(blip);
        }
    }

    blips
}
