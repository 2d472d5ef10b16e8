//! Leadline Targeting Engine
//!
//! Turns a per-tick snapshot of players into a selected target, a lead point
//! that compensates for target motion, projectile travel time and latency,
//! and its screen projection. Radar and bounding-box feeds come from the same
//! snapshot.
//!
//! Слои (снизу вверх):
//! - math, snapshot: геометрия и модель данных
//! - visibility, projection: фильтры видимости и world→screen
//! - prediction: итеративный решатель времени перехвата
//! - acquisition: захват цели (state machine)
//! - schedule, engine: частоты подсистем + общий mutex
//! - plugin: интеграция в Bevy App

use bevy::prelude::*;

pub mod acquisition;
pub mod config;
pub mod engine;
pub mod feeds;
pub mod logger;
pub mod math;
pub mod plugin;
pub mod prediction;
pub mod projection;
pub mod schedule;
pub mod snapshot;
pub mod visibility;

pub use acquisition::{LockEvent, LockState, TargetAcquisition, TargetLock};
pub use config::{AcquisitionMode, ConfigError, TargetingConfig};
pub use engine::{AimFeed, AimResult, AimStatus, ControlState, FrameOutput, TargetingEngine, TickReport};
pub use feeds::{OverlayEntry, RadarBlip};
pub use logger::{init_logger, LogLevel, LogPrinter};
pub use plugin::{
    AssistTrigger, LatestFrame, ResetLockRequested, SharedTargetingEngine, SubmitSnapshot, TargetingControl,
    TargetingOracle, TargetingPlugin, TargetingSystems,
};
pub use prediction::{LeadPredictor, ShotError};
pub use projection::{CameraProjection, ProjectionProvider, ScreenProjection, Viewport};
pub use snapshot::{EntityHandle, Player, Roster, Weapon, WeaponKind};
pub use visibility::{LineOfSightOracle, ObjectCategory, OpenFieldOracle, RayHit, RayMask};

/// Создаёт minimal Bevy App для headless хоста (60Hz FixedUpdate = game tick)
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}
