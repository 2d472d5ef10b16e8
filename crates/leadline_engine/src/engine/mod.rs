//! Targeting engine: the shared-state gate between the game tick and the
//! render frame.
//!
//! # Threads
//!
//! ```text
//! game tick (producer)                      render frame (consumer)
//!   begin_tick / observe_entity ─┐
//!   producer_tick ───────────────┼── Mutex<EngineState> ──┬── latest_frame
//!   reset_lock / update_config ──┘                        └── try_latest_frame
//! ```
//!
//! Every access goes through the one mutex, including every roster write.
//! The critical section is pure computation (the line-of-sight oracle is the
//! only callout), so contention stays short.
//!
//! A panic while the lock is held poisons it; the next caller recovers the
//! state and logs a warning instead of propagating the poison.

use bevy::math::{Vec2, Vec3};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Instant;

use crate::acquisition::{AcquisitionContext, LockEvent, TargetAcquisition, TargetLock};
use crate::config::{ConfigError, TargetingConfig};
use crate::feeds::{self, overlay, OverlayEntry, RadarBlip};
use crate::logger;
use crate::math;
use crate::prediction::{self, LeadPredictor, ShotError, ShotInput};
use crate::projection::{CameraProjection, ProjectionProvider, ScreenProjection};
use crate::schedule::{Subsystem, TickScheduler};
use crate::snapshot::{EntityHandle, Player, Roster};
use crate::visibility::{self, LineOfSightOracle};

/// Host input sampled on the game tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Assist trigger (hotkey / mouse button) currently held.
    pub assist_held: bool,
}

/// Solved aim point for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct AimResult {
    pub target: EntityHandle,
    pub predicted_world_point: Vec3,
    pub screen_projection: ScreenProjection,
    /// Local player → predicted point.
    pub distance: f32,
    /// Screen-space half height of the target, `None` when it did not project.
    pub apparent_height: Option<f32>,
}

impl AimResult {
    pub fn is_finite(&self) -> bool {
        math::is_finite_vec3(self.predicted_world_point)
            && math::is_finite_vec2(self.screen_projection.point)
            && self.distance.is_finite()
            && self.apparent_height.map_or(true, f32::is_finite)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AimStatus {
    /// Aim switched off, acquisition suspended or assist trigger released.
    #[default]
    Inactive,
    /// No valid local player, or it holds nothing that can be predicted.
    Unarmed,
    NoTarget,
    NoShot(ShotError),
    /// Solved, but the aim point is behind the player or off the projection.
    Offscreen,
    Solved,
}

/// Aim section of a frame. `results` holds at most one entry unless
/// target-everyone mode is on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AimFeed {
    pub status: AimStatus,
    pub results: Vec<AimResult>,
}

impl AimFeed {
    fn with_status(status: AimStatus) -> Self {
        Self {
            status,
            results: Vec::new(),
        }
    }

    pub fn primary(&self) -> Option<&AimResult> {
        self.results.first()
    }
}

/// Everything the presentation layer draws for one frame.
///
/// Each section is replaced only when its subsystem runs, so a render frame
/// between two aim polls still sees the last aim result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// Bumped every producer tick that ran at least one subsystem.
    pub sequence: u64,
    pub aim: AimFeed,
    pub overlay: Vec<OverlayEntry>,
    pub radar: Vec<RadarBlip>,
    /// The aim point sits in the target's trigger zone with a click-to-fire
    /// weapon equipped.
    pub fire_request: bool,
}

impl FrameOutput {
    pub fn is_finite(&self) -> bool {
        self.aim.results.iter().all(AimResult::is_finite)
            && self.overlay.iter().all(OverlayEntry::is_finite)
            && self.radar.iter().all(RadarBlip::is_finite)
    }
}

/// Which subsystems one `producer_tick` ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub aim: bool,
    pub radar: bool,
    pub overlay: bool,
    pub lock_event: Option<LockEvent>,
}

impl TickReport {
    pub fn any(&self) -> bool {
        self.aim || self.radar || self.overlay
    }
}

/// Projector used before the host pushed its first camera: nothing projects.
struct NoCamera;

impl ProjectionProvider for NoCamera {
    fn project(&self, _world: Vec3) -> ScreenProjection {
        ScreenProjection::INVALID
    }

    fn screen_center(&self) -> Vec2 {
        Vec2::ZERO
    }
}

struct EngineState {
    config: TargetingConfig,
    roster: Roster,
    /// Roster as of the previous aim cycle, for acceleration estimates.
    shadow: Option<(Roster, Instant)>,
    acquisition: TargetAcquisition,
    scheduler: TickScheduler,
    camera: Option<CameraProjection>,
    muzzle_offset: Vec3,
    frame: FrameOutput,
}

impl EngineState {
    fn new(config: TargetingConfig) -> Self {
        Self {
            scheduler: TickScheduler::new(&config.schedule),
            config,
            roster: Roster::default(),
            shadow: None,
            acquisition: TargetAcquisition::default(),
            camera: None,
            muzzle_offset: Vec3::ZERO,
            frame: FrameOutput::default(),
        }
    }

    fn projector(&self) -> &dyn ProjectionProvider {
        match &self.camera {
            Some(camera) => camera,
            None => &NoCamera,
        }
    }

    fn run_aim(&mut self, now: Instant, oracle: &dyn LineOfSightOracle, control: ControlState) -> Option<LockEvent> {
        let (feed, lock_event) = self.aim_cycle(now, oracle, control);

        self.frame.fire_request = self.fire_requested(&feed);
        self.frame.aim = feed;
        self.shadow = Some((self.roster.clone(), now));

        lock_event
    }

    fn aim_cycle(
        &mut self,
        now: Instant,
        oracle: &dyn LineOfSightOracle,
        control: ControlState,
    ) -> (AimFeed, Option<LockEvent>) {
        let aim = &self.config.aim;
        if !aim.enabled {
            return (AimFeed::with_status(AimStatus::Inactive), None);
        }

        let local = &self.roster.local;
        if !local.valid || !local.weapon.is_armed() {
            return (AimFeed::with_status(AimStatus::Unarmed), None);
        }

        if aim.require_assist_trigger && !control.assist_held {
            return (AimFeed::with_status(AimStatus::Inactive), None);
        }

        let dt_seconds = self
            .shadow
            .as_ref()
            .map(|(_, taken)| now.saturating_duration_since(*taken).as_secs_f32())
            .unwrap_or_default();
        let ctx = AcquisitionContext {
            roster: &self.roster,
            config: aim,
            projector: match &self.camera {
                Some(camera) => camera,
                None => &NoCamera,
            },
            oracle,
        };
        let shot = ShotContext {
            shooter: local,
            config: &self.config,
            shadow: self.shadow.as_ref().map(|(roster, _)| roster),
            dt_seconds,
            muzzle_offset: self.muzzle_offset,
            projector: ctx.projector,
        };

        if aim.target_everyone {
            let targets: Vec<&Player> = ctx.eligible_targets().collect();
            return (shot.solve_all(&targets), None);
        }

        let event = self.acquisition.poll(&ctx);
        let feed = match (event, self.acquisition.lock().target.as_ref()) {
            (LockEvent::Suspended | LockEvent::Dropped, _) => AimFeed::with_status(AimStatus::Inactive),
            (_, Some(target)) => shot.solve_all(&[target]),
            (_, None) => AimFeed::with_status(AimStatus::NoTarget),
        };
        (feed, Some(event))
    }

    /// Trigger zone: the aim point lies within the box drawn around the
    /// target (`width` horizontally, `height` vertically from the crosshair).
    fn fire_requested(&self, feed: &AimFeed) -> bool {
        if !self.config.aim.triggerbot || !self.roster.local.weapon.is_click_to_fire() {
            return false;
        }

        let crosshair = self.projector().screen_center();
        let ratio = self.config.overlay.width_to_height_ratio;
        feed.results.iter().any(|result| {
            let Some(height) = result.apparent_height else {
                return false;
            };
            let Some(point) = result.screen_projection.point() else {
                return false;
            };
            let width = ratio * height;
            (crosshair.x - point.x).abs() < width && (crosshair.y - point.y).abs() < height
        })
    }

    fn run_radar(&mut self) {
        self.frame.radar = if self.config.radar.enabled && self.roster.local.valid {
            feeds::build_radar(&self.roster, &self.config.radar)
        } else {
            Vec::new()
        };
    }

    fn run_overlay(&mut self) {
        self.frame.overlay = if self.config.overlay.enabled && self.roster.local.valid {
            feeds::build_overlay(&self.roster, &self.config.overlay, self.projector())
        } else {
            Vec::new()
        };
    }
}

/// Per-cycle inputs shared by every prediction in one aim poll.
struct ShotContext<'a> {
    shooter: &'a Player,
    config: &'a TargetingConfig,
    shadow: Option<&'a Roster>,
    dt_seconds: f32,
    muzzle_offset: Vec3,
    projector: &'a dyn ProjectionProvider,
}

impl ShotContext<'_> {
    fn solve_all(&self, targets: &[&Player]) -> AimFeed {
        if targets.is_empty() {
            return AimFeed::with_status(AimStatus::NoTarget);
        }

        let mut results = Vec::new();
        let mut first_error = None;
        for target in targets {
            match self.solve(target) {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(error) => {
                    logger::log(&format!("no shot at {:?}: {}", target.identity, error));
                    first_error.get_or_insert(error);
                }
            }
        }

        let status = match (results.is_empty(), first_error) {
            (false, _) => AimStatus::Solved,
            (true, Some(error)) => AimStatus::NoShot(error),
            (true, None) => AimStatus::Offscreen,
        };
        AimFeed { status, results }
    }

    /// `Ok(None)` when the prediction solved but cannot be shown.
    fn solve(&self, target: &Player) -> Result<Option<AimResult>, ShotError> {
        let weapon = self.shooter.weapon;
        let aim = &self.config.aim;

        let target_acceleration = if aim.acceleration.applies_to(weapon) {
            prediction::estimate_acceleration(target, self.shadow, self.dt_seconds)
        } else {
            Vec3::ZERO
        };

        let input = ShotInput {
            shooter: self.shooter,
            target,
            muzzle_offset: self.muzzle_offset,
            weapon_kind: self.shooter.weapon_kind,
            ballistics: self.config.ballistics.get(weapon),
            target_acceleration,
        };
        let solution = LeadPredictor::new(aim.predictor).predict(&input)?;

        if !visibility::in_field_of_view(self.shooter, solution.point) {
            return Ok(None);
        }
        let screen_projection = self.projector.project(solution.point);
        if !screen_projection.valid {
            return Ok(None);
        }

        let result = AimResult {
            target: target.identity,
            predicted_world_point: solution.point,
            screen_projection,
            distance: (solution.point - self.shooter.position()).length(),
            apparent_height: overlay::apparent_height(self.projector, target),
        };
        if !result.is_finite() {
            return Err(ShotError::Degenerate);
        }
        Ok(Some(result))
    }
}

/// One targeting session. Share it between threads through an `Arc`.
pub struct TargetingEngine {
    state: Mutex<EngineState>,
}

impl Default for TargetingEngine {
    fn default() -> Self {
        Self {
            state: Mutex::new(EngineState::new(TargetingConfig::default())),
        }
    }
}

impl TargetingEngine {
    pub fn new(config: TargetingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(EngineState::new(config)),
        })
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            logger::log_warning("⚠️ targeting state mutex was poisoned, recovering last state");
            self.state.clear_poison();
            poisoned.into_inner()
        })
    }

    // ----- entity feed -----

    /// Start of a game tick: the roster is emptied and the local player
    /// replaced.
    pub fn begin_tick(&self, local: Player) {
        let mut state = self.state();
        state.roster.clear();
        state.roster.set_local(local);
    }

    pub fn observe_entity(&self, player: Player) {
        self.state().roster.push(player);
    }

    /// `begin_tick` + `observe_entity` for every other player, in one lock.
    pub fn submit_snapshot(&self, local: Player, others: impl IntoIterator<Item = Player>) {
        let mut state = self.state();
        state.roster.clear();
        state.roster.set_local(local);
        for player in others {
            state.roster.push(player);
        }
    }

    pub fn update_camera(&self, camera: CameraProjection) {
        self.state().camera = Some(camera);
    }

    pub fn set_muzzle_offset(&self, offset: Vec3) {
        self.state().muzzle_offset = offset;
    }

    // ----- producer -----

    /// Run every subsystem whose timer is due at `now`.
    pub fn producer_tick(&self, now: Instant, oracle: &dyn LineOfSightOracle, control: ControlState) -> TickReport {
        let mut state = self.state();
        let mut report = TickReport::default();

        if state.scheduler.ready(Subsystem::Aim, now) {
            report.aim = true;
            report.lock_event = state.run_aim(now, oracle, control);
        }
        if state.scheduler.ready(Subsystem::Radar, now) {
            report.radar = true;
            state.run_radar();
        }
        if state.scheduler.ready(Subsystem::Overlay, now) {
            report.overlay = true;
            state.run_overlay();
        }

        if report.any() {
            state.frame.sequence += 1;
        }
        report
    }

    // ----- consumer -----

    pub fn latest_frame(&self) -> FrameOutput {
        self.state().frame.clone()
    }

    /// Non-blocking read for the render thread; `None` while the producer
    /// holds the lock.
    pub fn try_latest_frame(&self) -> Option<FrameOutput> {
        match self.state.try_lock() {
            Ok(state) => Some(state.frame.clone()),
            Err(TryLockError::Poisoned(poisoned)) => {
                logger::log_warning("⚠️ targeting state mutex was poisoned, recovering last state");
                self.state.clear_poison();
                Some(poisoned.into_inner().frame.clone())
            }
            Err(TryLockError::WouldBlock) => None,
        }
    }

    // ----- control -----

    /// Manual re-arm after a dropped lock.
    pub fn reset_lock(&self) {
        self.state().acquisition.reset();
        logger::log_info("🔄 target lock reset");
    }

    /// Master aim switch. Turning it off also clears the lock.
    pub fn set_aim_enabled(&self, enabled: bool) {
        let mut state = self.state();
        state.config.aim.enabled = enabled;
        if !enabled {
            state.acquisition.reset();
        }
        logger::log_info(&format!("aim {}", if enabled { "enabled" } else { "disabled" }));
    }

    /// Swap the configuration. Invalid configs are rejected and the current
    /// one stays in effect.
    pub fn update_config(&self, config: TargetingConfig) -> Result<(), ConfigError> {
        if let Err(error) = config.validate() {
            logger::log_warning(&format!("rejected targeting config: {}", error));
            return Err(error);
        }

        let mut state = self.state();
        if state.config.aim.enabled && !config.aim.enabled {
            state.acquisition.reset();
        }
        state.scheduler.apply(&config.schedule);
        state.config = config;
        Ok(())
    }

    pub fn config(&self) -> TargetingConfig {
        self.state().config.clone()
    }

    pub fn lock(&self) -> TargetLock {
        self.state().acquisition.lock().clone()
    }

    pub fn acquisition_enabled(&self) -> bool {
        self.state().acquisition.is_enabled()
    }

    pub fn roster(&self) -> Roster {
        self.state().roster.clone()
    }
}
