//! Session facade
//!
//! `Game` ties one `GameState` to the host's block layout and frame
//! scheduler, and keeps the loop's scheduling in step with lifecycle calls:
//! start and resume request frames, pause/reset/teardown cancel them.

use crate::config::GameConfig;
use crate::game_loop::{FrameId, FrameScheduler, GameLoop};
use crate::sim::{BlockLayout, EventBlock, GameSignal, GameState, GameStatus, SessionOptions, SimError, Snapshot};

/// Keyboard-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Space: start when idle, otherwise pause/resume
    TogglePlay,
    /// Ctrl/Cmd+R
    Reset,
}

impl Command {
    /// Map a DOM `KeyboardEvent.code` plus the Ctrl/Meta modifier state
    pub fn from_key(code: &str, ctrl_or_meta: bool) -> Option<Self> {
        match code {
            "Space" => Some(Command::TogglePlay),
            "KeyR" if ctrl_or_meta => Some(Command::Reset),
            _ => None,
        }
    }
}

pub struct Game<L: BlockLayout, S: FrameScheduler> {
    state: GameState,
    layout: L,
    scheduler: S,
    game_loop: GameLoop,
}

impl<L: BlockLayout, S: FrameScheduler> Game<L, S> {
    pub fn new(config: GameConfig, catalog: Vec<EventBlock>, options: SessionOptions, layout: L, scheduler: S) -> Self {
        let game_loop = GameLoop::new(&config);
        Self {
            state: GameState::new(config, catalog, options),
            layout,
            scheduler,
            game_loop,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts that script sessions (demos, tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Block geometry changes (resize, scroll) go through here
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn dismiss_tutorial(&mut self) {
        self.state.dismiss_tutorial();
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), SimError> {
        self.state.start()?;
        self.state.sync_clock(now_ms);
        self.game_loop.start(now_ms, &mut self.scheduler);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SimError> {
        self.state.pause()?;
        self.game_loop.stop(&mut self.scheduler);
        Ok(())
    }

    pub fn resume(&mut self, now_ms: f64) -> Result<(), SimError> {
        self.state.resume()?;
        // Effects that ran out while paused are restored before the first tick
        self.state.sync_clock(now_ms);
        self.game_loop.start(now_ms, &mut self.scheduler);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.game_loop.stop(&mut self.scheduler);
        self.state.reset();
    }

    /// Cancel any outstanding frame; the session itself is left as is
    pub fn teardown(&mut self) {
        self.game_loop.stop(&mut self.scheduler);
    }

    pub fn set_paddle_target_x(&mut self, x: f32) {
        self.state.set_paddle_target_x(x);
    }

    /// Advance the host clock without simulating (e.g. timers while paused)
    pub fn sync_clock(&mut self, now_ms: f64) {
        self.state.sync_clock(now_ms);
    }

    /// Deliver a frame from the scheduler; returns the number of ticks run
    pub fn on_frame(&mut self, frame: FrameId, now_ms: f64) -> u32 {
        self.state.sync_clock(now_ms);
        self.game_loop
            .on_frame(frame, now_ms, &mut self.state, &self.layout, &mut self.scheduler)
    }

    pub fn handle_command(&mut self, command: Command, now_ms: f64) -> Result<(), SimError> {
        match command {
            Command::TogglePlay => match self.state.status {
                GameStatus::Idle => self.start(now_ms),
                GameStatus::Playing => self.pause(),
                GameStatus::Paused => self.resume(now_ms),
                GameStatus::GameOver | GameStatus::Victory => Ok(()),
            },
            Command::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn drain_signals(&mut self) -> Vec<GameSignal> {
        self.state.drain_signals()
    }
}

impl<L: BlockLayout, S: FrameScheduler> Drop for Game<L, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
