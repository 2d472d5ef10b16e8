//! Runtime configuration surface.
//!
//! Every field is adjustable while the engine runs (`TargetingEngine::update_config`).
//! Nothing is persisted here; hosts that want persistence serialize
//! `TargetingConfig` themselves (it is plain serde data).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prediction::{BallisticsTable, PredictorParams};
use crate::schedule::{MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
use crate::snapshot::Weapon;

/// Ranking rule for target acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcquisitionMode {
    /// Minimize squared world distance from the local player.
    ClosestDistance,
    /// Minimize squared screen distance to the viewport center.
    #[default]
    ClosestToCrosshair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationConfig {
    pub enabled: bool,
    /// Only compensate acceleration for the rapid-fire weapons (Chaingun, Blaster).
    pub chaingun_only: bool,
}

impl AccelerationConfig {
    pub fn applies_to(&self, weapon: Weapon) -> bool {
        self.enabled && (!self.chaingun_only || matches!(weapon, Weapon::Chaingun | Weapon::Blaster))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    /// Master switch for acquisition + prediction.
    pub enabled: bool,
    pub mode: AcquisitionMode,
    /// Half-angle of the horizontal cone in crosshair mode (degrees).
    pub horizontal_fov_degrees: f32,
    pub friendly_fire: bool,
    pub require_line_of_sight: bool,
    /// Predict for every eligible player instead of holding one lock.
    pub target_everyone: bool,
    pub stay_locked: bool,
    /// With `stay_locked`: pick a new target as soon as the old one is gone.
    pub auto_relock: bool,
    /// Publish aim results only while the assist trigger is held.
    pub require_assist_trigger: bool,
    /// Raise `fire_request` when the prediction sits in the trigger zone.
    pub triggerbot: bool,
    pub acceleration: AccelerationConfig,
    pub predictor: PredictorParams,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: AcquisitionMode::ClosestToCrosshair,
            horizontal_fov_degrees: 90.0,
            friendly_fire: false,
            require_line_of_sight: true,
            target_everyone: false,
            stay_locked: true,
            auto_relock: false,
            require_assist_trigger: false,
            triggerbot: false,
            acceleration: AccelerationConfig::default(),
            predictor: PredictorParams::default(),
        }
    }
}

/// Bounding-box overlay feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub show_friendlies: bool,
    /// Box width as a fraction of its projected height.
    pub width_to_height_ratio: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_friendlies: false,
            width_to_height_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub enabled: bool,
    pub show_friendlies: bool,
    /// Drop blips further than this (world units). `None` = unlimited.
    pub max_range: Option<f32>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_friendlies: false,
            max_range: None,
        }
    }
}

/// Poll frequencies per subsystem (Hz).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub aim_hz: f32,
    pub radar_hz: f32,
    pub overlay_hz: f32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            aim_hz: 60.0,
            radar_hz: 300.0,
            overlay_hz: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub aim: AimConfig,
    pub ballistics: BallisticsTable,
    pub overlay: OverlayConfig,
    pub radar: RadarConfig,
    pub schedule: ScheduleConfig,
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    HorizontalFov(f32),
    ProjectileSpeed { weapon: Weapon, value: f32 },
    Inheritance { weapon: Weapon, value: f32 },
    Latency { weapon: Weapon, value: f32 },
    Frequency { subsystem: &'static str, value: f32 },
    WidthRatio(f32),
    RadarRange(f32),
    Predictor(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HorizontalFov(value) => {
                write!(f, "horizontal FOV must be in (0, 180] degrees, got {}", value)
            }
            ConfigError::ProjectileSpeed { weapon, value } => {
                write!(f, "{} projectile speed must be finite and >= 0, got {}", weapon.label(), value)
            }
            ConfigError::Inheritance { weapon, value } => {
                write!(f, "{} velocity inheritance must be in [0, 1], got {}", weapon.label(), value)
            }
            ConfigError::Latency { weapon, value } => {
                write!(f, "{} latency must be finite, got {}", weapon.label(), value)
            }
            ConfigError::Frequency { subsystem, value } => write!(
                f,
                "{} poll frequency must be in [{}, {}] Hz, got {}",
                subsystem, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ, value
            ),
            ConfigError::WidthRatio(value) => {
                write!(f, "width/height ratio must be finite and > 0, got {}", value)
            }
            ConfigError::RadarRange(value) => {
                write!(f, "radar range must be finite and > 0, got {}", value)
            }
            ConfigError::Predictor(reason) => write!(f, "invalid predictor parameters: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TargetingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = self.aim.horizontal_fov_degrees;
        if !(fov > 0.0 && fov <= 180.0) {
            return Err(ConfigError::HorizontalFov(fov));
        }

        let predictor = &self.aim.predictor;
        if predictor.max_iterations < 2 {
            return Err(ConfigError::Predictor("max_iterations must be at least 2"));
        }
        if !(predictor.epsilon > 0.0 && predictor.epsilon.is_finite()) {
            return Err(ConfigError::Predictor("epsilon must be finite and > 0"));
        }
        if !predictor.latency_weight.is_finite() {
            return Err(ConfigError::Predictor("latency_weight must be finite"));
        }

        for (weapon, ballistics) in self.ballistics.iter() {
            let speed = ballistics.projectile_speed;
            if !(speed >= 0.0 && speed.is_finite()) {
                return Err(ConfigError::ProjectileSpeed { weapon, value: speed });
            }
            let inheritance = ballistics.velocity_inheritance;
            if !(0.0..=1.0).contains(&inheritance) {
                return Err(ConfigError::Inheritance {
                    weapon,
                    value: inheritance,
                });
            }
            if !ballistics.latency_ms.is_finite() {
                return Err(ConfigError::Latency {
                    weapon,
                    value: ballistics.latency_ms,
                });
            }
        }

        let frequencies = [
            ("aim", self.schedule.aim_hz),
            ("radar", self.schedule.radar_hz),
            ("overlay", self.schedule.overlay_hz),
        ];
        for (subsystem, value) in frequencies {
            if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&value) {
                return Err(ConfigError::Frequency { subsystem, value });
            }
        }

        let ratio = self.overlay.width_to_height_ratio;
        if !(ratio > 0.0 && ratio.is_finite()) {
            return Err(ConfigError::WidthRatio(ratio));
        }

        if let Some(range) = self.radar.max_range {
            if !(range > 0.0 && range.is_finite()) {
                return Err(ConfigError::RadarRange(range));
            }
        }

        Ok(())
    }
}
