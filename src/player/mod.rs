//! Player — the frame loop and playback state machine.
//!
//! The player owns the clock and decides *when* the engine evaluates; the
//! engine decides *what* a given time looks like. Scheduling is cooperative:
//! `play` requests a frame, every frame that runs re-requests the next one
//! while playback is running, and `pause` only clears the running flag, so the
//! already-requested frame observes it and does nothing.

pub mod clock;
pub mod config;
mod interactive;

use crate::engine::Engine;
use crate::errors::Result;
use crate::renderer::RenderAdapter;

pub use clock::{Clock, ClockMode, DEFAULT_STEP};
pub use config::PlayerConfig;
pub use interactive::{play_interactive, CANVAS_OFFSET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Playback was not running; nothing was evaluated.
    Idle,
    Rendered,
    /// The clock ran past the end and restarted at zero.
    Looped,
    /// The clock ran past the end of a non-looping animation.
    Finished,
}

pub struct Player {
    engine: Engine,
    clock: Clock,
    state: PlaybackState,
    running: bool,
    frame_requested: bool,
}

impl Player {
    pub fn new(engine: Engine, mode: ClockMode) -> Self {
        Player {
            engine,
            clock: Clock::new(mode),
            state: PlaybackState::Stopped,
            running: false,
            frame_requested: false,
        }
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        log::debug!("Playback started at {:.3}s", self.clock.time());
        self.state = PlaybackState::Playing;
        self.running = true;
        self.frame_requested = true;
        self.clock.resume();
    }

    /// Takes effect at the next frame boundary.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            log::debug!("Playback paused at {:.3}s", self.clock.time());
            self.state = PlaybackState::Paused;
        }
        self.running = false;
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Halt playback and rewind the clock. The next `play` starts at zero.
    pub fn stop(&mut self) {
        self.running = false;
        self.state = PlaybackState::Stopped;
        self.clock.reset();
    }

    /// Evaluate and render the scene at `t` without touching playback state.
    pub fn seek<A>(&mut self, t: f32, adapter: &mut A) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        self.clock.set(t);
        self.engine.evaluate(t, adapter)
    }

    /// The per-frame callback.
    pub fn on_frame<A>(&mut self, adapter: &mut A) -> Result<FrameOutcome>
    where
        A: RenderAdapter + ?Sized,
    {
        self.frame_requested = false;
        if !self.running {
            return Ok(FrameOutcome::Idle);
        }

        let mut outcome = FrameOutcome::Rendered;
        if self.clock.advance() > self.engine.duration() {
            if self.engine.looping() {
                self.clock.reset();
                outcome = FrameOutcome::Looped;
            } else {
                log::debug!("Reached the end of a non-looping animation");
                self.running = false;
                self.state = PlaybackState::Paused;
                return Ok(FrameOutcome::Finished);
            }
        }

        self.engine.evaluate(self.clock.time(), adapter)?;
        self.frame_requested = self.running;
        Ok(outcome)
    }

    /// Drive frames back to back until none is requested or `max_frames`
    /// callbacks have run. Returns the number of callbacks.
    pub fn run_headless<A>(&mut self, adapter: &mut A, max_frames: u64) -> Result<u64>
    where
        A: RenderAdapter + ?Sized,
    {
        let mut frames = 0;
        while self.frame_requested && frames < max_frames {
            self.on_frame(adapter)?;
            frames += 1;
        }
        Ok(frames)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}
