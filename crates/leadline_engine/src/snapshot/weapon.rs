//! Weapon identity and ballistic class.
//!
//! The feed reports the equipped weapon as a resource name; the engine maps it
//! through a fixed exact-match table. Anything it does not recognise is
//! treated as "no weapon" with a hitscan class.

use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// Equipped weapon of the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    None,
    Disc,
    Chaingun,
    GrenadeLauncher,
    Plasma,
    Blaster,
    Sniper,
    Shocklance,
    Unknown,
}

/// How a shot travels once fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Hit registers instantly at the aim point.
    #[default]
    Hitscan,
    /// Constant relative speed, optionally inheriting shooter velocity.
    LinearProjectile,
    /// Ballistic arc. The predictor does not model it.
    ArchingProjectile,
}

/// Number of `Weapon` variants (size of per-weapon tables).
pub const WEAPON_COUNT: usize = 9;

/// Resource name → (weapon, kind).
const RESOURCE_TABLE: [(&str, Weapon, WeaponKind); 7] = [
    ("weapon_chaingun.dts", Weapon::Chaingun, WeaponKind::LinearProjectile),
    ("weapon_disc.dts", Weapon::Disc, WeaponKind::LinearProjectile),
    ("weapon_grenade_launcher.dts", Weapon::GrenadeLauncher, WeaponKind::ArchingProjectile),
    ("weapon_plasma.dts", Weapon::Plasma, WeaponKind::LinearProjectile),
    ("weapon_sniper.dts", Weapon::Sniper, WeaponKind::Hitscan),
    ("weapon_shocklance.dts", Weapon::Shocklance, WeaponKind::Hitscan),
    ("weapon_energy.dts", Weapon::Blaster, WeaponKind::LinearProjectile),
];

impl Weapon {
    pub const ALL: [Weapon; WEAPON_COUNT] = [
        Weapon::None,
        Weapon::Disc,
        Weapon::Chaingun,
        Weapon::GrenadeLauncher,
        Weapon::Plasma,
        Weapon::Blaster,
        Weapon::Sniper,
        Weapon::Shocklance,
        Weapon::Unknown,
    ];

    /// Map a weapon resource name (exact, case-sensitive match).
    pub fn from_resource_name(name: &str) -> (Weapon, WeaponKind) {
        RESOURCE_TABLE
            .iter()
            .find(|(resource, _, _)| *resource == name)
            .map(|&(_, weapon, kind)| (weapon, kind))
            .unwrap_or((Weapon::None, WeaponKind::Hitscan))
    }

    /// Default ballistic class of this weapon.
    pub fn kind(self) -> WeaponKind {
        match self {
            Weapon::Disc | Weapon::Chaingun | Weapon::Plasma | Weapon::Blaster => {
                WeaponKind::LinearProjectile
            }
            Weapon::GrenadeLauncher => WeaponKind::ArchingProjectile,
            Weapon::None | Weapon::Sniper | Weapon::Shocklance | Weapon::Unknown => {
                WeaponKind::Hitscan
            }
        }
    }

    /// Dense index for per-weapon tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the engine runs the aim pipeline at all with this weapon.
    pub fn is_armed(self) -> bool {
        !matches!(self, Weapon::None | Weapon::Unknown)
    }

    /// One click = one shot. Hold-to-fire weapons (Chaingun) and hitscan
    /// weapons never get a trigger-zone fire request.
    pub fn is_click_to_fire(self) -> bool {
        matches!(
            self,
            Weapon::Disc | Weapon::GrenadeLauncher | Weapon::Plasma | Weapon::Blaster
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Weapon::None => "none",
            Weapon::Disc => "disc",
            Weapon::Chaingun => "chaingun",
            Weapon::GrenadeLauncher => "grenade launcher",
            Weapon::Plasma => "plasma",
            Weapon::Blaster => "blaster",
            Weapon::Sniper => "sniper",
            Weapon::Shocklance => "shocklance",
            Weapon::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_table_exact_match() {
        assert_eq!(
            Weapon::from_resource_name("weapon_disc.dts"),
            (Weapon::Disc, WeaponKind::LinearProjectile)
        );
        assert_eq!(
            Weapon::from_resource_name("weapon_grenade_launcher.dts"),
            (Weapon::GrenadeLauncher, WeaponKind::ArchingProjectile)
        );
        assert_eq!(
            Weapon::from_resource_name("weapon_energy.dts"),
            (Weapon::Blaster, WeaponKind::LinearProjectile)
        );
        assert_eq!(
            Weapon::from_resource_name("weapon_sniper.dts"),
            (Weapon::Sniper, WeaponKind::Hitscan)
        );
    }

    #[test]
    fn test_unrecognised_resource_is_none_hitscan() {
        for name in ["", "weapon_disc", "WEAPON_DISC.DTS", "weapon_mortar.dts"] {
            assert_eq!(
                Weapon::from_resource_name(name),
                (Weapon::None, WeaponKind::Hitscan),
                "{name:?} must not match"
            );
        }
    }

    #[test]
    fn test_table_agrees_with_kind() {
        for (_, weapon, kind) in RESOURCE_TABLE {
            assert_eq!(weapon.kind(), kind);
        }
    }

    #[test]
    fn test_index_is_dense() {
        for (i, weapon) in Weapon::ALL.iter().enumerate() {
            assert_eq!(weapon.index(), i);
        }
    }
}
