//! Per-weapon ballistic parameters.
//!
//! One table indexed by `Weapon`, not one named field per weapon. Values are
//! runtime-tunable: overshooting means the configured speed is too low,
//! undershooting means it is too high.

use serde::{Deserialize, Serialize};

use crate::snapshot::weapon::{Weapon, WEAPON_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponBallistics {
    /// Units per second. 0 = instant (hitscan or unmodelled).
    pub projectile_speed: f32,
    /// Fraction of the shooter's velocity imparted to the shot, `[0, 1]`.
    pub velocity_inheritance: f32,
    /// One-way latency compensation added to the flight time (ms, may be negative).
    pub latency_ms: f32,
}

impl WeaponBallistics {
    pub const INSTANT: WeaponBallistics = WeaponBallistics {
        projectile_speed: 0.0,
        velocity_inheritance: 0.0,
        latency_ms: 0.0,
    };

    pub const fn projectile(projectile_speed: f32, velocity_inheritance: f32) -> Self {
        Self {
            projectile_speed,
            velocity_inheritance,
            latency_ms: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallisticsTable {
    entries: [WeaponBallistics; WEAPON_COUNT],
}

impl Default for BallisticsTable {
    fn default() -> Self {
        let mut entries = [WeaponBallistics::INSTANT; WEAPON_COUNT];
        entries[Weapon::Disc.index()] = WeaponBallistics::projectile(95.0, 0.75);
        entries[Weapon::Chaingun.index()] = WeaponBallistics::projectile(425.0, 0.75);
        entries[Weapon::GrenadeLauncher.index()] = WeaponBallistics::projectile(0.0, 0.75);
        entries[Weapon::Plasma.index()] = WeaponBallistics::projectile(55.0, 0.3);
        entries[Weapon::Blaster.index()] = WeaponBallistics::projectile(90.0, 0.5);
        Self { entries }
    }
}

impl BallisticsTable {
    pub fn get(&self, weapon: Weapon) -> WeaponBallistics {
        self.entries[weapon.index()]
    }

    pub fn get_mut(&mut self, weapon: Weapon) -> &mut WeaponBallistics {
        &mut self.entries[weapon.index()]
    }

    pub fn set(&mut self, weapon: Weapon, ballistics: WeaponBallistics) {
        self.entries[weapon.index()] = ballistics;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weapon, WeaponBallistics)> + '_ {
        Weapon::ALL.iter().map(move |&weapon| (weapon, self.get(weapon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_values() {
        let table = BallisticsTable::default();
        assert_eq!(table.get(Weapon::Disc), WeaponBallistics::projectile(95.0, 0.75));
        assert_eq!(table.get(Weapon::Chaingun).projectile_speed, 425.0);
        assert_eq!(table.get(Weapon::Plasma).velocity_inheritance, 0.3);
        assert_eq!(table.get(Weapon::Sniper), WeaponBallistics::INSTANT);
    }

    #[test]
    fn test_latency_is_per_weapon() {
        let mut table = BallisticsTable::default();
        table.get_mut(Weapon::Disc).latency_ms = -90.0;
        assert_eq!(table.get(Weapon::Disc).latency_ms, -90.0);
        assert_eq!(table.get(Weapon::Chaingun).latency_ms, 0.0);
    }
}
