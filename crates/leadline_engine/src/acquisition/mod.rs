//! Target acquisition state machine.
//!
//! # States
//!
//! ```text
//!            scan finds a candidate
//! Unlocked ─────────────────────────▶ Locked
//!    ▲                                  │ stay_locked && target still valid
//!    │                                  └──▶ Locked (re-resolved by identity, no ranking)
//!    │  stay_locked && target gone && !auto_relock
//!    └──────────────────────────────── Locked   (acquisition suspended until reset)
//! ```
//!
//! Without `stay_locked` every poll is a fresh scan.
//!
//! # Ranking
//!
//! Survivors of the filters (team → visibility → line of sight) are ranked by
//! squared screen distance to the crosshair or squared world distance. The
//! first candidate is accepted outright, later ones replace it only on strict
//! improvement, so exact ties go to the earlier roster entry.

use bevy::math::Vec2;

use crate::config::{AcquisitionMode, AimConfig};
use crate::logger;
use crate::projection::ProjectionProvider;
use crate::snapshot::{EntityHandle, Player, Roster};
use crate::visibility::{self, LineOfSightOracle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

/// Currently acquired target (snapshot by value) and whether it is held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetLock {
    pub target: Option<Player>,
    pub locked: bool,
}

impl TargetLock {
    pub fn locked_on(target: Player) -> Self {
        Self {
            target: Some(target),
            locked: true,
        }
    }

    pub fn state(&self) -> LockState {
        if self.locked && self.target.is_some() {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }

    pub fn identity(&self) -> Option<EntityHandle> {
        self.target.as_ref().map(|target| target.identity)
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.locked = false;
    }
}

/// What one poll did to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    /// Stay-locked: same identity re-resolved from the new roster.
    Held,
    /// Scan picked a target while nothing was locked.
    Acquired,
    /// Scan picked a different target than the previous one.
    Switched,
    /// Scan picked the same target again.
    Refreshed,
    /// Scan found nothing.
    NoTarget,
    /// Locked target vanished; acquisition is now suspended.
    Dropped,
    /// Acquisition is suspended (waiting for `reset`).
    Suspended,
}

/// Read-only view of one tick's world needed for acquisition.
#[derive(Clone, Copy)]
pub struct AcquisitionContext<'a> {
    pub roster: &'a Roster,
    pub config: &'a AimConfig,
    pub projector: &'a dyn ProjectionProvider,
    pub oracle: &'a dyn LineOfSightOracle,
}

impl<'a> AcquisitionContext<'a> {
    fn local(&self) -> &'a Player {
        &self.roster.local
    }

    /// Team → visibility → line of sight. `require_cone` adds the horizontal
    /// FOV cone on top of the half-space test.
    pub fn passes_filters(&self, candidate: &Player, require_cone: bool) -> bool {
        let local = self.local();

        if local.is_same_team(candidate) && !self.config.friendly_fire {
            return false;
        }

        if !visibility::in_field_of_view(local, candidate.position()) {
            return false;
        }
        if require_cone
            && !visibility::in_horizontal_fov(local, candidate.position(), self.config.horizontal_fov_degrees)
        {
            return false;
        }

        if self.config.require_line_of_sight && !visibility::has_line_of_sight(self.oracle, local, candidate) {
            return false;
        }

        true
    }

    /// Every candidate that passes all filters including the cone, roster order.
    pub fn eligible_targets(&self) -> impl Iterator<Item = &'a Player> + '_ {
        self.roster
            .candidates()
            .filter(move |candidate| self.passes_filters(candidate, true))
    }

    /// Ranking score (lower is better), `None` when the candidate cannot be
    /// ranked under the active mode.
    fn score(&self, candidate: &Player, crosshair: Vec2) -> Option<f32> {
        let score = match self.config.mode {
            AcquisitionMode::ClosestToCrosshair => {
                let point = self.projector.project(candidate.position()).point()?;
                (point - crosshair).length_squared()
            }
            AcquisitionMode::ClosestDistance => {
                (self.local().position() - candidate.position()).length_squared()
            }
        };
        score.is_finite().then_some(score)
    }

    /// Best-ranked candidate, first-found wins on exact ties.
    pub fn scan(&self) -> Option<&'a Player> {
        let require_cone = self.config.mode == AcquisitionMode::ClosestToCrosshair;
        let crosshair = self.projector.screen_center();

        let mut best: Option<(&'a Player, f32)> = None;
        for candidate in self.roster.candidates() {
            if !self.passes_filters(candidate, require_cone) {
                continue;
            }
            let Some(score) = self.score(candidate, crosshair) else {
                continue;
            };

            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best.map(|(candidate, _)| candidate)
    }
}

/// Lock holder + re-acquisition policy.
#[derive(Debug, Clone)]
pub struct TargetAcquisition {
    lock: TargetLock,
    enabled: bool,
}

impl Default for TargetAcquisition {
    fn default() -> Self {
        Self {
            lock: TargetLock::default(),
            enabled: true,
        }
    }
}

impl TargetAcquisition {
    pub fn lock(&self) -> &TargetLock {
        &self.lock
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Manual re-arm: clear the lock and allow acquisition again.
    pub fn reset(&mut self) {
        self.lock.clear();
        self.enabled = true;
    }

    /// Clear the lock and suspend acquisition.
    pub fn disable(&mut self) {
        self.lock.clear();
        self.enabled = false;
    }

    /// One acquisition cycle against the current roster.
    pub fn poll(&mut self, ctx: &AcquisitionContext<'_>) -> LockEvent {
        if !self.enabled {
            return LockEvent::Suspended;
        }

        let previous = self.lock.identity();

        if ctx.config.stay_locked {
            if let Some(identity) = previous {
                match ctx.roster.find(identity).filter(|player| player.valid) {
                    Some(current) => {
                        self.lock = TargetLock::locked_on(current.clone());
                        return LockEvent::Held;
                    }
                    None if !ctx.config.auto_relock => {
                        logger::log_info(&format!(
                            "🔓 LOCK DROPPED: target {:?} is gone, acquisition suspended until reset",
                            identity
                        ));
                        self.disable();
                        return LockEvent::Dropped;
                    }
                    None => {}
                }
            }
        }

        match ctx.scan() {
            Some(found) => {
                self.lock = TargetLock::locked_on(found.clone());
                match previous {
                    None => {
                        logger::log_info(&format!("🎯 TARGET ACQUIRED: {:?}", found.identity));
                        LockEvent::Acquired
                    }
                    Some(old) if old == found.identity => LockEvent::Refreshed,
                    Some(old) => {
                        logger::log_info(&format!(
                            "🎯 TARGET SWITCH: {:?} → {:?}",
                            old, found.identity
                        ));
                        LockEvent::Switched
                    }
                }
            }
            None => {
                self.lock.clear();
                LockEvent::NoTarget
            }
        }
    }
}
