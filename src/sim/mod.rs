//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (catalog order for event blocks)
//! - No rendering or platform dependencies; block geometry comes in through `BlockLayout`

pub mod catalog;
pub mod collision;
pub mod geometry;
pub mod powerup;
pub mod scoring;
pub mod state;
pub mod tick;

pub use catalog::{BlockLayout, EventBlock, MINUTES_PER_WEEK, StaticLayout};
pub use collision::{
    CollisionResult, Side, aabb_overlap, apply_collision_response, calculate_paddle_reflection,
    check_circle_rect_collision, normalize, predict_collision, reflect_velocity,
};
pub use geometry::{Circle, Rect};
pub use powerup::{ActiveEffects, PowerUp, PowerUpKind};
pub use scoring::{ScoringPolicy, score_for_hit};
pub use state::{
    Ball, EventStatus, GameSignal, GameState, GameStatus, Paddle, SessionOptions, SimError, Snapshot,
};
pub use tick::{find_event_hit, tick};
