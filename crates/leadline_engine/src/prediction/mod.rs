//! Lead predictor: where to aim so a projectile meets a moving target.
//!
//! # Algorithm
//!
//! Flight time depends on distance, distance depends on where the target will
//! be, and that depends on flight time. A closed form exists only for the
//! constant-velocity case; fixed-point iteration also covers target
//! acceleration and velocity inheritance from the shooter:
//!
//! ```text
//! d[i] = |U - prediction|
//! t[i] = d[i] / speed
//! stop when i > 0 && |t[i] - t[i-1]| < epsilon
//! prediction = P0 + V·t + ½·A·t² − (Uv·inherit)·t
//! ```
//!
//! After convergence the one-way latency is added to the flight time and the
//! prediction is evaluated once more.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math;
use crate::snapshot::{Player, Roster, WeaponKind};

pub mod ballistics;

pub use ballistics::{BallisticsTable, WeaponBallistics};

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorParams {
    /// Distance evaluations before giving up.
    pub max_iterations: usize,
    /// Convergence tolerance on successive flight times (seconds).
    pub epsilon: f32,
    /// Multiplier on the latency term folded into the target's start
    /// position. 0 = the latency only extends the final flight time.
    pub latency_weight: f32,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            epsilon: 0.05 / 3.0,
            latency_weight: 0.0,
        }
    }
}

/// Why no shot is available this poll. Never fatal; the next poll starts fresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotError {
    /// Flight time did not settle within `max_iterations`.
    NotConverged { iterations: usize },
    /// Arching projectiles are not modelled.
    ArchingUnsupported,
    /// Linear weapon with zero / negative / non-finite projectile speed.
    InvalidBallistics { projectile_speed: f32 },
    /// Inputs produced a non-finite intermediate.
    Degenerate,
}

impl fmt::Display for ShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotError::NotConverged { iterations } => {
                write!(f, "intercept time did not converge after {} iterations", iterations)
            }
            ShotError::ArchingUnsupported => write!(f, "arching projectiles are not predicted"),
            ShotError::InvalidBallistics { projectile_speed } => {
                write!(f, "invalid projectile speed {}", projectile_speed)
            }
            ShotError::Degenerate => write!(f, "degenerate geometry in lead prediction"),
        }
    }
}

impl std::error::Error for ShotError {}

/// Everything one prediction needs. Built fresh per target per poll.
#[derive(Debug, Clone, Copy)]
pub struct ShotInput<'a> {
    pub shooter: &'a Player,
    pub target: &'a Player,
    /// World-space vector from shooter position to muzzle.
    pub muzzle_offset: Vec3,
    pub weapon_kind: WeaponKind,
    pub ballistics: WeaponBallistics,
    /// Finite-difference estimate, `Vec3::ZERO` when disabled.
    pub target_acceleration: Vec3,
}

/// Converged aim point.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub point: Vec3,
    /// Final flight time including latency compensation (seconds).
    pub time_of_flight: f32,
    /// `t[i]` for every distance evaluation, in order.
    pub flight_times: Vec<f32>,
}

impl Solution {
    /// Number of distance evaluations the solver ran.
    pub fn iterations(&self) -> usize {
        self.flight_times.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadPredictor {
    pub params: PredictorParams,
}

impl LeadPredictor {
    pub fn new(params: PredictorParams) -> Self {
        Self { params }
    }

    pub fn predict(&self, input: &ShotInput<'_>) -> Result<Solution, ShotError> {
        match input.weapon_kind {
            WeaponKind::Hitscan => Ok(Solution {
                point: input.target.position(),
                time_of_flight: 0.0,
                flight_times: Vec::new(),
            }),
            WeaponKind::ArchingProjectile => Err(ShotError::ArchingUnsupported),
            WeaponKind::LinearProjectile => self.solve_linear(input),
        }
    }

    fn solve_linear(&self, input: &ShotInput<'_>) -> Result<Solution, ShotError> {
        let speed = input.ballistics.projectile_speed;
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(ShotError::InvalidBallistics { projectile_speed: speed });
        }

        let latency_s = input.ballistics.latency_ms / 1000.0;
        let target_velocity = input.target.velocity();
        let acceleration = input.target_acceleration;
        let shooter_origin = input.shooter.position() + input.muzzle_offset;
        let inherited = input.shooter.velocity() * input.ballistics.velocity_inheritance;

        // Стартовая точка: latency-член присутствует, но по умолчанию с весом 0
        let ping_t = latency_s * self.params.latency_weight;
        let start = input.target.position()
            + target_velocity * ping_t
            + acceleration * (ping_t * ping_t * 0.5);

        let extrapolate = |t: f32| -> Vec3 {
            start + target_velocity * t + acceleration * (t * t * 0.5) - inherited * t
        };

        let max_iterations = self.params.max_iterations;
        let mut flight_times: Vec<f32> = Vec::with_capacity(max_iterations);
        let mut prediction = start;
        let mut converged = false;

        while flight_times.len() < max_iterations {
            let distance = (shooter_origin - prediction).length();
            let t = distance / speed;
            if !t.is_finite() {
                return Err(ShotError::Degenerate);
            }

            let settled = flight_times
                .last()
                .is_some_and(|&previous| (t - previous).abs() < self.params.epsilon);
            flight_times.push(t);
            if settled {
                converged = true;
                break;
            }

            prediction = extrapolate(t);
        }

        if !converged {
            return Err(ShotError::NotConverged {
                iterations: flight_times.len(),
            });
        }

        let settled_time = flight_times.last().copied().unwrap_or_default();
        let time_of_flight = settled_time + latency_s;
        let point = extrapolate(time_of_flight);

        if !math::is_finite_vec3(point) {
            return Err(ShotError::Degenerate);
        }

        Ok(Solution {
            point,
            time_of_flight,
            flight_times,
        })
    }
}

/// `(v_now − v_prev) / dt` for `target`, with `v_prev` taken from the shadow
/// roster by identity. Zero when there is no match or `dt` is unusable.
pub fn estimate_acceleration(target: &Player, shadow: Option<&Roster>, dt_seconds: f32) -> Vec3 {
    if !(dt_seconds > math::EPSILON && dt_seconds.is_finite()) {
        return Vec3::ZERO;
    }

    let Some(previous) = shadow.and_then(|roster| roster.find(target.identity)) else {
        return Vec3::ZERO;
    };

    let acceleration = (target.velocity() - previous.velocity()) / dt_seconds;
    if math::is_finite_vec3(acceleration) {
        acceleration
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod prediction_tests;
