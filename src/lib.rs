//! Calendar Breakout - ball-and-paddle arcade over a weekly calendar
//!
//! Core modules:
//! - `sim`: Simulation (physics, collisions, scoring, power-ups, game state)
//! - `game_loop`: Fixed-timestep scheduler with cancellable frame requests
//! - `game`: Facade wiring a session, block layout and scheduler together
//! - `config`: Device-class tuning and JSON overrides

pub mod config;
pub mod game;
pub mod game_loop;
pub mod sim;

pub use config::{ConfigError, DeviceClass, GameConfig, Playfield};
pub use game::{Command, Game};
pub use game_loop::{FrameId, FrameScheduler, GameLoop, ManualScheduler};

/// Game configuration constants
pub mod consts {
    /// Lives at session start
    pub const INITIAL_LIVES: u8 = 3;
    /// Extra-life pickups never raise lives above this
    pub const MAX_LIVES: u8 = 5;

    /// Scoring
    pub const BASE_SCORE: u64 = 100;
    pub const COMBO_MULTIPLIER: f32 = 0.5;
    /// Bonus per remaining life shown on the victory screen
    pub const VICTORY_LIFE_BONUS: u64 = 500;

    /// Ball radius (mobile / desktop)
    pub const BALL_RADIUS_MOBILE: f32 = 6.0;
    pub const BALL_RADIUS_DESKTOP: f32 = 8.0;
    /// Launch speed per axis, pixels per 60 Hz frame
    pub const BALL_SPEED_MOBILE: f32 = 4.0;
    pub const BALL_SPEED_DESKTOP: f32 = 5.5;
    /// Per-axis speed cap, pixels per 60 Hz frame
    pub const BALL_MAX_SPEED_MOBILE: f32 = 8.0;
    pub const BALL_MAX_SPEED_DESKTOP: f32 = 10.0;
    /// Ball counts as lost once its center is this far below the screen
    pub const BALL_LOST_MARGIN: f32 = 50.0;
    /// Respawn height, measured up from the bottom of the screen
    pub const BALL_RESPAWN_OFFSET: f32 = 200.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH_MOBILE: f32 = 80.0;
    pub const PADDLE_WIDTH_DESKTOP: f32 = 120.0;
    pub const PADDLE_HEIGHT_MOBILE: f32 = 10.0;
    pub const PADDLE_HEIGHT_DESKTOP: f32 = 14.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    /// Gap between paddle bottom and screen bottom
    pub const PADDLE_BOTTOM_OFFSET: f32 = 80.0;
    /// Horizontal and vertical forgiveness for paddle hits
    pub const PADDLE_HIT_TOLERANCE: f32 = 10.0;

    /// Power-ups
    pub const POWERUP_DROP_CHANCE: f32 = 0.2;
    pub const POWERUP_FALL_SPEED_MOBILE: f32 = 2.0;
    pub const POWERUP_FALL_SPEED_DESKTOP: f32 = 3.0;
    /// Margin around the paddle rect for collecting a power-up
    pub const POWERUP_PICKUP_MARGIN: f32 = 20.0;
    pub const WIDEN_MULTIPLIER: f32 = 1.5;
    pub const WIDEN_DURATION_MS: f64 = 10_000.0;
    pub const SLOW_BALL_MULTIPLIER: f32 = 0.5;
    pub const SLOW_BALL_DURATION_MS: f64 = 8_000.0;

    /// Calendar chrome the ball bounces off
    pub const TIME_COLUMN_WIDTH_MOBILE: f32 = 48.0;
    pub const TIME_COLUMN_WIDTH_DESKTOP: f32 = 60.0;
    pub const HEADER_HEIGHT_MOBILE: f32 = 50.0;
    pub const HEADER_HEIGHT_DESKTOP: f32 = 60.0;

    /// Simulation rate; ball and power-up speeds are tuned per frame at this rate
    pub const TARGET_FPS: u32 = 60;
    /// Maximum simulation steps per rendered frame to prevent spiral of death
    pub const MAX_STEPS_PER_FRAME: u32 = 5;

    /// Velocity damping applied on event-block bounces
    pub const COLLISION_DAMPING: f32 = 0.98;
    /// Max launch deviation from straight up for angle-based paddle reflection
    pub const MAX_PADDLE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
    /// Extra speed at the very edge of the paddle for angle-based reflection
    pub const PADDLE_EDGE_SPEED_BOOST: f32 = 0.15;
}

/// Clamp `value` into `[min, max]`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(max.min(value))
}

/// Linear interpolation from `start` to `end`
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}
