//! Per-subsystem poll timers.
//!
//! # Architecture
//!
//! The producer is invoked at the host's native tick rate. Each subsystem
//! (aim, radar, overlay) only runs when its own timer is due, so the expensive
//! work is decoupled from the game's update rate:
//!
//! ```text
//! producer_tick(now)
//!   ├─ Aim.ready(now)     → acquisition + prediction   (default 60 Hz)
//!   ├─ Radar.ready(now)   → radar feed                 (default 300 Hz)
//!   └─ Overlay.ready(now) → bounding-box feed          (default 300 Hz)
//! ```
//!
//! # Why next-due, not an accumulator?
//!
//! The timer stores the instant it next becomes due. Changing the frequency
//! re-derives that instant from the last firing, so a period change neither
//! releases a burst of catch-up ticks nor stalls the subsystem.

use std::time::{Duration, Instant};

use crate::config::ScheduleConfig;

pub const MIN_FREQUENCY_HZ: f32 = 1.0;
pub const MAX_FREQUENCY_HZ: f32 = 300.0;

/// Periodic gate: fires at most once per period.
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    last_fired: Option<Instant>,
    next_due: Option<Instant>,
}

impl PollTimer {
    pub fn from_hz(frequency_hz: f32) -> Self {
        Self {
            period: period_for(frequency_hz),
            last_fired: None,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn frequency_hz(&self) -> f32 {
        1.0 / self.period.as_secs_f32()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }

    /// True when more than one period has elapsed since the last firing (or
    /// on the very first call). Firing re-arms the timer from `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.next_due {
            None => true,
            Some(next_due) => now > next_due,
        };

        if due {
            self.last_fired = Some(now);
            self.next_due = Some(now + self.period);
        }
        due
    }

    /// Change the rate in place. The next due time is re-derived from the
    /// last firing; elapsed-time bookkeeping is otherwise untouched.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.period = period_for(frequency_hz);
        if let Some(last_fired) = self.last_fired {
            self.next_due = Some(last_fired + self.period);
        }
    }

    /// Forget the last firing: the next `ready` call fires immediately.
    pub fn reset(&mut self) {
        self.last_fired = None;
        self.next_due = None;
    }
}

fn period_for(frequency_hz: f32) -> Duration {
    let hz = if frequency_hz.is_finite() {
        frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
    } else {
        MIN_FREQUENCY_HZ
    };
    Duration::from_secs_f32(1.0 / hz)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// Acquisition + lead prediction.
    Aim,
    Radar,
    Overlay,
}

impl Subsystem {
    pub const ALL: [Subsystem; 3] = [Subsystem::Aim, Subsystem::Radar, Subsystem::Overlay];

    fn index(self) -> usize {
        self as usize
    }
}

/// One independent timer per subsystem.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    timers: [PollTimer; 3],
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(&ScheduleConfig::default())
    }
}

impl TickScheduler {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            timers: [
                PollTimer::from_hz(config.aim_hz),
                PollTimer::from_hz(config.radar_hz),
                PollTimer::from_hz(config.overlay_hz),
            ],
        }
    }

    pub fn ready(&mut self, subsystem: Subsystem, now: Instant) -> bool {
        self.timers[subsystem.index()].ready(now)
    }

    pub fn timer(&self, subsystem: Subsystem) -> &PollTimer {
        &self.timers[subsystem.index()]
    }

    pub fn set_frequency(&mut self, subsystem: Subsystem, frequency_hz: f32) {
        self.timers[subsystem.index()].set_frequency(frequency_hz);
    }

    /// Push new frequencies; only timers whose rate changed are touched.
    pub fn apply(&mut self, config: &ScheduleConfig) {
        let wanted = [config.aim_hz, config.radar_hz, config.overlay_hz];
        for (subsystem, hz) in Subsystem::ALL.into_iter().zip(wanted) {
            if self.timer(subsystem).period() != period_for(hz) {
                self.set_frequency(subsystem, hz);
            }
        }
    }
}
