//! Bevy integration: drives the engine from the host's fixed game tick.
//!
//! The host feeds snapshots and control input as events; the producer tick
//! runs in `FixedUpdate` and the latest frame is mirrored into a resource for
//! anything in the ECS that draws. Render threads outside the app read the
//! same `Arc<TargetingEngine>` directly.

use bevy::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::config::TargetingConfig;
use crate::engine::{ControlState, FrameOutput, TargetingEngine};
use crate::logger;
use crate::snapshot::Player;
use crate::visibility::{LineOfSightOracle, OpenFieldOracle};

/// Engine handle shared between the app and external threads.
#[derive(Resource, Clone)]
pub struct SharedTargetingEngine(pub Arc<TargetingEngine>);

/// Collision world used for line-of-sight checks.
#[derive(Resource)]
pub struct TargetingOracle(pub Box<dyn LineOfSightOracle>);

impl Default for TargetingOracle {
    fn default() -> Self {
        Self(Box::new(OpenFieldOracle))
    }
}

/// Control input as of the last `AssistTrigger` event.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct TargetingControl(pub ControlState);

/// Copy of the engine output after the last producer tick that ran something.
#[derive(Resource, Default, Debug, Clone)]
pub struct LatestFrame(pub FrameOutput);

/// One game tick worth of entities. Only the newest snapshot per tick is used.
#[derive(Event, Debug, Clone)]
pub struct SubmitSnapshot {
    pub local: Player,
    pub others: Vec<Player>,
}

/// Systems that move data in and out of the engine. Hosts order their own
/// snapshot producers `.before(TargetingSystems)`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetingSystems;

/// Manual re-arm after a dropped lock.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetLockRequested;

#[derive(Event, Debug, Clone, Copy)]
pub struct AssistTrigger {
    pub held: bool,
}

/// Targeting Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. forward_snapshots: последний SubmitSnapshot → roster
/// 2. forward_control: reset + assist trigger
/// 3. run_targeting: producer tick + зеркалирование FrameOutput
///
/// A `SharedTargetingEngine` inserted before the plugin is kept, so the host
/// can hand the same engine to its render thread.
#[derive(Default)]
pub struct TargetingPlugin {
    pub config: TargetingConfig,
}

impl Plugin for TargetingPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SharedTargetingEngine>() {
            let engine = TargetingEngine::new(self.config.clone()).unwrap_or_else(|error| {
                logger::log_error(&format!("targeting config rejected ({}), using defaults", error));
                TargetingEngine::default()
            });
            app.insert_resource(SharedTargetingEngine(Arc::new(engine)));
        }
        if !app.world().contains_resource::<TargetingOracle>() {
            app.init_resource::<TargetingOracle>();
        }

        app.init_resource::<TargetingControl>()
            .init_resource::<LatestFrame>()
            .add_event::<SubmitSnapshot>()
            .add_event::<ResetLockRequested>()
            .add_event::<AssistTrigger>();

        app.add_systems(
            FixedUpdate,
            (forward_snapshots, forward_control, run_targeting)
                .chain()
                .in_set(TargetingSystems),
        );
    }
}

fn forward_snapshots(engine: Res<SharedTargetingEngine>, mut snapshots: EventReader<SubmitSnapshot>) {
    if let Some(snapshot) = snapshots.read().last() {
        engine
            .0
            .submit_snapshot(snapshot.local.clone(), snapshot.others.iter().cloned());
    }
}

fn forward_control(
    engine: Res<SharedTargetingEngine>,
    mut resets: EventReader<ResetLockRequested>,
    mut triggers: EventReader<AssistTrigger>,
    mut control: ResMut<TargetingControl>,
) {
    if !resets.is_empty() {
        resets.clear();
        engine.0.reset_lock();
    }
    if let Some(trigger) = triggers.read().last() {
        control.0.assist_held = trigger.held;
    }
}

fn run_targeting(
    engine: Res<SharedTargetingEngine>,
    oracle: Res<TargetingOracle>,
    control: Res<TargetingControl>,
    mut latest: ResMut<LatestFrame>,
) {
    let report = engine.0.producer_tick(Instant::now(), oracle.0.as_ref(), control.0);
    if report.any() {
        latest.0 = engine.0.latest_frame();
    }
}
