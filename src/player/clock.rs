//! Animation clock.
//!
//! `Fixed` advances by the same step every tick regardless of how long the
//! frame really took, which keeps playback deterministic. `RealTime` uses the
//! measured wall-clock delta instead.

use std::time::Instant;

/// Nominal frame step: 60 ticks per second.
pub const DEFAULT_STEP: f32 = 1.0 / 60.0;

/// Largest configurable fixed step.
pub const MAX_FIXED_STEP: f32 = 1.0;

/// Largest real-time step, so a stalled host does not skip the timeline.
pub const MAX_REALTIME_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockMode {
    Fixed(f32),
    RealTime,
}

impl Default for ClockMode {
    fn default() -> Self {
        ClockMode::Fixed(DEFAULT_STEP)
    }
}

#[derive(Debug, Clone)]
pub struct Clock {
    mode: ClockMode,
    time: f32,
    last_tick: Option<Instant>,
}

impl Clock {
    pub fn new(mode: ClockMode) -> Self {
        Clock {
            mode,
            time: 0.0,
            last_tick: None,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Move the clock forward one tick and return the new time.
    pub fn advance(&mut self) -> f32 {
        let step = match self.mode {
            ClockMode::Fixed(step) => step,
            ClockMode::RealTime => {
                let now = Instant::now();
                let step = self
                    .last_tick
                    .map_or(DEFAULT_STEP, |last| (now - last).as_secs_f32())
                    .min(MAX_REALTIME_STEP);
                self.last_tick = Some(now);
                step
            }
        };
        self.time += step;
        self.time
    }

    /// Back to zero. Any overshoot past the end is dropped.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn set(&mut self, time: f32) {
        self.time = time;
    }

    /// Forget the last real-time tick so a pause is not counted as a step.
    pub fn resume(&mut self) {
        self.last_tick = None;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new(ClockMode::default())
    }
}
