//! Power-ups: drop, fall, pickup and timed effects
//!
//! Timed effects are deadlines on the host's wall clock rather than
//! detached timers. The clock advances through `GameState::sync_clock`,
//! which is called every frame and on resume, so effects keep expiring in
//! real time while the game is paused. `reset` drops every deadline, and a
//! second pickup of the same kind refreshes the running deadline instead of
//! stacking another restore.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::state::{GameSignal, GameState};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerUpKind {
    /// Reserved: drops and can be collected but has no effect yet
    Multiball,
    WidenPaddle,
    SlowBall,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Multiball,
        PowerUpKind::WidenPaddle,
        PowerUpKind::SlowBall,
        PowerUpKind::ExtraLife,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Multiball => "multiball",
            PowerUpKind::WidenPaddle => "widen-paddle",
            PowerUpKind::SlowBall => "slow-ball",
            PowerUpKind::ExtraLife => "extra-life",
        }
    }
}

/// A falling power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub active: bool,
}

/// Running timed effects, as deadlines on the host clock (milliseconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Latest host time seen by the session
    pub clock_ms: f64,
    pub widen_until: Option<f64>,
    pub slow_until: Option<f64>,
}

impl ActiveEffects {
    pub fn widen_active(&self) -> bool {
        self.widen_until.is_some()
    }

    pub fn slow_active(&self) -> bool {
        self.slow_until.is_some()
    }

    /// Drop every pending deadline without running its restore
    pub fn cancel_all(&mut self) {
        self.widen_until = None;
        self.slow_until = None;
    }
}

/// Roll for a drop where an event block was destroyed
pub fn maybe_spawn(state: &mut GameState, pos: Vec2) -> Option<PowerUpKind> {
    let roll: f32 = state.rng.random();
    if roll >= state.config.powerup_drop_chance {
        return None;
    }

    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    state.powerups.push(PowerUp {
        id,
        kind,
        pos,
        active: true,
    });
    log::debug!("Spawned {} power-up #{} at ({:.0}, {:.0})", kind.as_str(), id, pos.x, pos.y);
    Some(kind)
}

/// Collection area around the paddle
fn pickup_zone(state: &GameState) -> Rect {
    let paddle = &state.paddle;
    Rect::new(paddle.x, paddle.y, paddle.width, paddle.height).expanded(state.config.powerup_pickup_margin)
}

/// Advance falling power-ups by `frames` reference frames, despawn those
/// past the bottom of the screen, and collect those touching the paddle
pub fn update_powerups(state: &mut GameState, frames: f32) {
    let fall = state.config.powerup_fall_speed * frames;
    let bottom = state.config.playfield.height;

    for powerup in state.powerups.iter_mut() {
        powerup.pos.y += fall;
    }
    // Missed power-ups just disappear
    state.powerups.retain(|p| p.pos.y < bottom);

    let zone = pickup_zone(state);
    let mut collected = Vec::new();
    state.powerups.retain(|p| {
        if zone.contains_point(p.pos) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        apply_effect(state, kind);
    }
}

/// Apply a collected power-up
pub fn apply_effect(state: &mut GameState, kind: PowerUpKind) {
    let now = state.effects.clock_ms;
    match kind {
        PowerUpKind::ExtraLife => {
            state.lives = (state.lives + 1).min(state.config.max_lives);
        }
        PowerUpKind::WidenPaddle => {
            // Always relative to the base width so overlapping pickups never compound
            state.paddle.width = state.paddle.base_width * state.config.widen_multiplier;
            let pf = state.config.playfield;
            state.paddle.x = crate::clamp(state.paddle.x, pf.time_column_width, pf.width - state.paddle.width);
            state.effects.widen_until = Some(now + state.config.widen_duration_ms);
        }
        PowerUpKind::SlowBall => {
            if !state.effects.slow_active() {
                state.ball.vel *= state.config.slow_multiplier;
            }
            state.effects.slow_until = Some(now + state.config.slow_duration_ms);
        }
        PowerUpKind::Multiball => {
            log::debug!("Multiball collected; no effect");
        }
    }
    log::debug!("Collected {} (lives {}, paddle width {:.0})", kind.as_str(), state.lives, state.paddle.width);
    state.signals.push(GameSignal::PowerUpCollected { kind });
}

/// Run the restore for every effect whose deadline has passed
pub fn expire_effects(state: &mut GameState) {
    let now = state.effects.clock_ms;

    if state.effects.widen_until.is_some_and(|t| now >= t) {
        state.effects.widen_until = None;
        state.paddle.width = state.paddle.base_width;
        log::debug!("Widen expired, paddle width back to {:.0}", state.paddle.width);
        state.signals.push(GameSignal::EffectExpired {
            kind: PowerUpKind::WidenPaddle,
        });
    }

    if state.effects.slow_until.is_some_and(|t| now >= t) {
        state.effects.slow_until = None;
        let max = state.config.max_speed;
        let vel = state.ball.vel / state.config.slow_multiplier;
        state.ball.vel = vel.clamp(Vec2::splat(-max), Vec2::splat(max));
        log::debug!("Slow-ball expired");
        state.signals.push(GameSignal::EffectExpired {
            kind: PowerUpKind::SlowBall,
        });
    }
}
