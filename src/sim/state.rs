//! Game state and the session lifecycle
//!
//! `GameState` owns everything the simulation mutates: ball, paddle,
//! destroyed-event set, power-ups, running effects, score, lives and status.
//! Lifecycle calls (`start`, `pause`, `resume`, `reset`) are the only
//! external transitions; game over and victory happen inside `tick`.

use std::collections::{BTreeSet, HashSet};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::EventBlock;
use super::powerup::{self, ActiveEffects, PowerUp, PowerUpKind};
use crate::config::GameConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// Waiting for start
    Idle,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// All lives lost
    GameOver,
    /// Every event block destroyed
    Victory,
}

impl GameStatus {
    pub fn is_playing(&self) -> bool {
        *self == GameStatus::Playing
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition { from: GameStatus, action: &'static str },
    #[error("tutorial must be dismissed before the game can start")]
    TutorialPending,
}

/// Fire-and-forget notifications for audio, particles and HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameSignal {
    WallHit,
    PaddleHit,
    EventDestroyed { id: String, points: u64 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    EffectExpired { kind: PowerUpKind },
    LifeLost { lives_left: u8 },
    GameOver,
    Victory,
}

/// The ball. Velocity is in pixels per reference frame (see `consts::TARGET_FPS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Nominal launch speed per axis
    pub speed: f32,
}

impl Ball {
    /// Ball at the launch spot, moving up and to the right
    pub fn launch(config: &GameConfig) -> Self {
        let pf = &config.playfield;
        Self {
            pos: Vec2::new(pf.width / 2.0, pf.height - crate::consts::BALL_RESPAWN_OFFSET),
            vel: Vec2::new(config.ball_speed, -config.ball_speed),
            radius: config.ball_radius,
            speed: config.ball_speed,
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge (fixed for the session)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Width recorded at session start; widen always restores to this
    pub base_width: f32,
}

impl Paddle {
    /// Paddle centered on the playfield
    pub fn centered(config: &GameConfig) -> Self {
        Self {
            x: config.playfield.width / 2.0 - config.paddle_width / 2.0,
            y: config.paddle_y(),
            width: config.paddle_width,
            height: config.paddle_height,
            speed: config.paddle_speed,
            base_width: config.paddle_width,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Host-provided session settings that would otherwise come from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Block `start` until the tutorial is dismissed
    pub show_tutorial: bool,
    /// Seed for power-up drops
    pub seed: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            show_tutorial: false,
            seed: 0x5eed_ca1e,
        }
    }
}

/// Destroyed-state of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatus {
    pub id: String,
    pub destroyed: bool,
}

/// Everything a renderer or HUD reads after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: GameStatus,
    pub score: u64,
    pub lives: u8,
    pub combo: u32,
    pub level: u32,
    pub ball: Ball,
    pub paddle: Paddle,
    pub events: Vec<EventStatus>,
    pub powerups: Vec<PowerUp>,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub status: GameStatus,
    /// Monotonic within a session
    pub score: u64,
    pub lives: u8,
    /// Consecutive hits since the ball was last lost
    pub combo: u32,
    /// Reserved, always 1
    pub level: u32,
    pub ball: Ball,
    pub paddle: Paddle,
    /// Event catalog in hit-test order
    pub events: Vec<EventBlock>,
    /// Ids of destroyed events; only grows until `reset`
    pub destroyed: BTreeSet<String>,
    /// Catalog size captured at start, the victory target
    pub total_events: usize,
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub show_tutorial: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Latest pointer position, applied at the start of the next tick
    pub(crate) paddle_target_x: Option<f32>,
    pub(crate) signals: Vec<GameSignal>,
    next_id: u32,
}

impl GameState {
    /// Create an idle session over `catalog`
    ///
    /// Duplicate ids would make victory unreachable, so only the first
    /// entry for each id is kept.
    pub fn new(config: GameConfig, catalog: Vec<EventBlock>, options: SessionOptions) -> Self {
        let mut seen = HashSet::new();
        let events: Vec<EventBlock> = catalog
            .into_iter()
            .filter(|event| {
                let fresh = seen.insert(event.id.clone());
                if !fresh {
                    log::warn!("Dropping duplicate event id {:?}", event.id);
                }
                fresh
            })
            .collect();

        Self {
            ball: Ball::launch(&config),
            paddle: Paddle::centered(&config),
            lives: config.initial_lives,
            total_events: events.len(),
            config,
            seed: options.seed,
            rng: Pcg32::seed_from_u64(options.seed),
            status: GameStatus::Idle,
            score: 0,
            combo: 0,
            level: 1,
            events,
            destroyed: BTreeSet::new(),
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            show_tutorial: options.show_tutorial,
            time_ticks: 0,
            paddle_target_x: None,
            signals: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn dismiss_tutorial(&mut self) {
        self.show_tutorial = false;
    }

    /// Idle → Playing
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.status != GameStatus::Idle {
            return Err(SimError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        if self.show_tutorial {
            return Err(SimError::TutorialPending);
        }

        self.ball = Ball::launch(&self.config);
        self.paddle = Paddle::centered(&self.config);
        self.combo = 0;
        self.powerups.clear();
        self.effects.cancel_all();
        self.total_events = self.events.len();
        self.status = GameStatus::Playing;
        log::info!("Game started with {} events", self.total_events);
        Ok(())
    }

    /// Playing → Paused. Running effects keep their wall-clock deadlines.
    pub fn pause(&mut self) -> Result<(), SimError> {
        if self.status != GameStatus::Playing {
            return Err(SimError::InvalidTransition {
                from: self.status,
                action: "pause",
            });
        }
        self.status = GameStatus::Paused;
        log::info!("Game paused");
        Ok(())
    }

    /// Paused → Playing
    pub fn resume(&mut self) -> Result<(), SimError> {
        if self.status != GameStatus::Paused {
            return Err(SimError::InvalidTransition {
                from: self.status,
                action: "resume",
            });
        }
        self.status = GameStatus::Playing;
        log::info!("Game resumed");
        Ok(())
    }

    /// Any state → Idle with a fresh session. Pending effects are cancelled.
    pub fn reset(&mut self) {
        self.status = GameStatus::Idle;
        self.score = 0;
        self.lives = self.config.initial_lives;
        self.combo = 0;
        self.level = 1;
        self.destroyed.clear();
        self.ball = Ball::launch(&self.config);
        self.paddle = Paddle::centered(&self.config);
        self.powerups.clear();
        self.effects.cancel_all();
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.paddle_target_x = None;
        self.signals.clear();
        self.time_ticks = 0;
        log::info!("Game reset");
    }

    /// Record the pointer position; last write before a tick wins
    pub fn set_paddle_target_x(&mut self, x: f32) {
        self.paddle_target_x = Some(x);
    }

    /// Center the paddle on the latest pointer position, kept inside the walls
    pub(crate) fn apply_paddle_target(&mut self) {
        if let Some(target) = self.paddle_target_x {
            let pf = &self.config.playfield;
            self.paddle.x = crate::clamp(target - self.paddle.width / 2.0, pf.time_column_width, pf.width - self.paddle.width);
        }
    }

    /// Advance the host clock and run any effect restores that are due
    ///
    /// Called every frame regardless of status, so effects expire in real
    /// time even while paused.
    pub fn sync_clock(&mut self, now_ms: f64) {
        self.effects.clock_ms = self.effects.clock_ms.max(now_ms);
        powerup::expire_effects(self);
    }

    pub fn is_destroyed(&self, id: &str) -> bool {
        self.destroyed.contains(id)
    }

    pub fn remaining_events(&self) -> usize {
        self.total_events.saturating_sub(self.destroyed.len())
    }

    /// Score shown on the victory screen: remaining lives earn a bonus
    pub fn final_score(&self) -> u64 {
        self.score + self.lives as u64 * self.config.victory_life_bonus
    }

    /// Take the signals emitted since the last drain
    pub fn drain_signals(&mut self) -> Vec<GameSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            score: self.score,
            lives: self.lives,
            combo: self.combo,
            level: self.level,
            ball: self.ball.clone(),
            paddle: self.paddle.clone(),
            events: self
                .events
                .iter()
                .map(|e| EventStatus {
                    id: e.id.clone(),
                    destroyed: self.is_destroyed(&e.id),
                })
                .collect(),
            powerups: self.powerups.clone(),
        }
    }
}
