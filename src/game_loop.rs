//! Fixed-timestep game loop
//!
//! Each rendered frame adds the elapsed wall-clock time to an accumulator
//! and runs whole simulation steps out of it, at most `max_steps` per frame.
//! When the cap is hit with a whole step still owed, the leftover time is
//! dropped instead of carried, so a long stall never turns into a burst of
//! catch-up ticks. A partial step left after a full frame is carried.
//!
//! Frames are requested from a [`FrameScheduler`]. The loop keeps at most
//! one request outstanding, only re-requests while the session is Playing,
//! and cancels the outstanding request on [`GameLoop::stop`]. A frame that
//! arrives with an id the loop no longer holds is ignored.

use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::sim::{BlockLayout, GameState, tick};

/// Handle for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Source of animation frames (the browser's `requestAnimationFrame`, a
/// native event loop, or a test driver)
pub trait FrameScheduler {
    /// Ask for one callback on the next frame
    fn request_frame(&mut self) -> FrameId;
    /// Withdraw a request; cancelling an unknown or fired id is a no-op
    fn cancel_frame(&mut self, id: FrameId);
}

/// Scheduler driven by hand: requests queue up until the host fires them
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameId>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest outstanding request, as if its frame arrived
    pub fn next_frame(&mut self) -> Option<FrameId> {
        self.pending.pop_front()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: FrameId) -> bool {
        self.pending.contains(&id)
    }

    /// Number of requests withdrawn before they fired
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending.push_back(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let before = self.pending.len();
        self.pending.retain(|pending| *pending != id);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}

/// Accumulator state for the fixed-timestep loop
#[derive(Debug, Clone)]
pub struct GameLoop {
    fixed_step_ms: f64,
    max_steps: u32,
    accumulator: f64,
    last_time: Option<f64>,
    pending: Option<FrameId>,
}

impl GameLoop {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_step(config.fixed_step_ms(), config.max_steps_per_frame)
    }

    pub fn with_step(fixed_step_ms: f64, max_steps: u32) -> Self {
        Self {
            fixed_step_ms,
            max_steps,
            accumulator: 0.0,
            last_time: None,
            pending: None,
        }
    }

    pub fn fixed_step_ms(&self) -> f64 {
        self.fixed_step_ms
    }

    /// Leftover time not yet simulated, in milliseconds
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    /// Begin requesting frames, measuring elapsed time from `now_ms`
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, now_ms: f64, scheduler: &mut S) {
        self.accumulator = 0.0;
        self.last_time = Some(now_ms);
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Cancel the outstanding frame request and forget the timing state
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel_frame(id);
        }
        self.accumulator = 0.0;
        self.last_time = None;
    }

    /// Handle one delivered frame; returns the number of ticks run
    pub fn on_frame<L, S>(&mut self, frame: FrameId, now_ms: f64, state: &mut GameState, layout: &L, scheduler: &mut S) -> u32
    where
        L: BlockLayout + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        if self.pending != Some(frame) {
            log::debug!("Ignoring stale frame {:?}", frame);
            return 0;
        }
        self.pending = None;

        if !state.status.is_playing() {
            self.stop(scheduler);
            return 0;
        }

        let last = self.last_time.unwrap_or(now_ms);
        self.accumulator += (now_ms - last).max(0.0);
        self.last_time = Some(now_ms);

        let dt = (self.fixed_step_ms / 1000.0) as f32;
        let mut steps = 0;
        while self.accumulator >= self.fixed_step_ms && steps < self.max_steps {
            tick(state, layout, dt);
            self.accumulator -= self.fixed_step_ms;
            steps += 1;
            if !state.status.is_playing() {
                break;
            }
        }

        if steps == self.max_steps && self.accumulator >= self.fixed_step_ms {
            log::debug!("Step cap hit, dropping {:.1}ms of simulation time", self.accumulator);
            self.accumulator = 0.0;
        }

        if state.status.is_playing() {
            self.pending = Some(scheduler.request_frame());
        } else {
            self.stop(scheduler);
        }
        steps
    }
}
