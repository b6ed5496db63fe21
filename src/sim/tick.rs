//! Fixed timestep simulation tick
//!
//! One call advances a Playing session by `dt` seconds: paddle input, ball
//! motion, wall/ceiling/paddle/bottom tests, the first event-block hit in
//! catalog order, power-ups, speed limits and the victory check.

use glam::Vec2;

use super::catalog::BlockLayout;
use super::collision::{CollisionResult, apply_collision_response, check_circle_rect_collision};
use super::geometry::Circle;
use super::powerup;
use super::scoring::ScoringPolicy;
use super::state::{Ball, GameSignal, GameState, GameStatus};
use crate::consts::{BALL_LOST_MARGIN, TARGET_FPS};

/// What happened to the ball at the bottom of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BottomOutcome {
    InPlay,
    Respawned,
    GameOver,
}

/// Advance the game state by one fixed timestep
///
/// Does nothing unless the session is Playing. `layout` is asked for each
/// live block's rectangle; blocks without one are skipped this tick.
pub fn tick<L: BlockLayout + ?Sized>(state: &mut GameState, layout: &L, dt: f32) {
    if !state.status.is_playing() {
        return;
    }

    state.time_ticks += 1;
    // Velocities are per reference frame
    let frames = dt * TARGET_FPS as f32;

    state.apply_paddle_target();
    state.ball.pos += state.ball.vel * frames;

    resolve_walls(state);
    resolve_paddle(state);

    match resolve_bottom(state) {
        BottomOutcome::GameOver => return,
        // Fresh ball at the launch spot: no block test this tick
        BottomOutcome::Respawned => {}
        BottomOutcome::InPlay => resolve_event_hit(state, layout),
    }

    powerup::update_powerups(state, frames);
    limit_speed(state);
    check_victory(state);
}

/// Side walls bound the grid between the time column and the screen edge;
/// the ceiling is the bottom of the calendar header
fn resolve_walls(state: &mut GameState) {
    let pf = state.config.playfield;
    let ball = &mut state.ball;
    let r = ball.radius;

    if ball.pos.x - r <= pf.time_column_width {
        ball.pos.x = pf.time_column_width + r;
        ball.vel.x = ball.vel.x.abs();
        state.signals.push(GameSignal::WallHit);
    } else if ball.pos.x + r >= pf.width {
        ball.pos.x = pf.width - r;
        ball.vel.x = -ball.vel.x.abs();
        state.signals.push(GameSignal::WallHit);
    }

    if ball.pos.y - r <= pf.header_height {
        ball.pos.y = pf.header_height + r;
        if ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y;
            state.signals.push(GameSignal::WallHit);
        }
    }
}

/// Impulse bounce: the ball's bottom edge against the paddle's band, with
/// the horizontal extent widened by the hit tolerance
fn resolve_paddle(state: &mut GameState) {
    let tolerance = state.config.paddle_hit_tolerance;
    let max_speed = state.config.max_speed;
    let paddle = &state.paddle;
    let ball = &mut state.ball;

    let bottom = ball.pos.y + ball.radius;
    let in_band = bottom >= paddle.y && bottom <= paddle.y + paddle.height + tolerance;
    let in_span = ball.pos.x >= paddle.x - tolerance && ball.pos.x <= paddle.x + paddle.width + tolerance;
    if !(in_band && in_span) {
        return;
    }

    // -1 at the left edge, 1 at the right edge (beyond that inside the tolerance)
    let hit_offset = (ball.pos.x - paddle.center_x()) / (paddle.width / 2.0);
    ball.pos.y = paddle.y - ball.radius;
    ball.vel.y = -ball.vel.y.abs();
    ball.vel.x = crate::clamp(ball.vel.x + hit_offset * 2.0, -max_speed, max_speed);

    log::debug!("Paddle hit at offset {:.2}", hit_offset);
    state.signals.push(GameSignal::PaddleHit);
}

/// Ball fell past the bottom: lose a life and the combo, then respawn or end
fn resolve_bottom(state: &mut GameState) -> BottomOutcome {
    if state.ball.pos.y <= state.config.playfield.height + BALL_LOST_MARGIN {
        return BottomOutcome::InPlay;
    }

    scoring_policy(state).register_miss(&mut state.combo);
    state.lives = state.lives.saturating_sub(1);
    state.signals.push(GameSignal::LifeLost { lives_left: state.lives });

    // Fresh nominal velocity, so a running slow effect has nothing to restore
    state.ball = Ball::launch(&state.config);
    state.effects.slow_until = None;

    if state.lives == 0 {
        state.status = GameStatus::GameOver;
        state.powerups.clear();
        state.signals.push(GameSignal::GameOver);
        log::info!("Game over with score {}", state.score);
        return BottomOutcome::GameOver;
    }

    log::debug!("Ball lost, {} lives left", state.lives);
    BottomOutcome::Respawned
}

/// First live block, in catalog order, that the ball touches this tick
pub fn find_event_hit<L: BlockLayout + ?Sized>(state: &GameState, layout: &L) -> Option<(usize, CollisionResult)> {
    let circle = Circle {
        center: state.ball.pos,
        radius: state.ball.radius,
    };

    state
        .events
        .iter()
        .enumerate()
        .filter(|(_, event)| !state.is_destroyed(&event.id))
        .find_map(|(index, event)| {
            let rect = layout.block_rect(&event.id)?;
            let collision = check_circle_rect_collision(&circle, &rect);
            collision.hit.then_some((index, collision))
        })
}

fn resolve_event_hit<L: BlockLayout + ?Sized>(state: &mut GameState, layout: &L) {
    let Some((index, collision)) = find_event_hit(state, layout) else {
        return;
    };

    let id = state.events[index].id.clone();
    state.destroyed.insert(id.clone());
    let points = scoring_policy(state).register_hit(&mut state.score, &mut state.combo);
    log::debug!("Destroyed event {} for {} points (combo {})", id, points, state.combo);

    let hit_pos = state.ball.pos;
    if let Some(kind) = powerup::maybe_spawn(state, hit_pos) {
        state.signals.push(GameSignal::PowerUpSpawned { kind });
    }

    let (pos, vel) = apply_collision_response(state.ball.pos, state.ball.vel, &collision);
    state.ball.pos = pos;
    state.ball.vel = vel;
    state.signals.push(GameSignal::EventDestroyed { id, points });
}

/// Lift a crawling ball back to the minimum speed, then clamp each axis
/// to the maximum independently
pub fn limit_speed(state: &mut GameState) {
    let min = state.config.min_speed;
    let max = state.config.max_speed;
    let vel = state.ball.vel;

    let speed = vel.length();
    let vel = if speed > 0.0 && speed < min { vel * (min / speed) } else { vel };

    state.ball.vel = vel.clamp(Vec2::splat(-max), Vec2::splat(max));
}

fn check_victory(state: &mut GameState) {
    if state.status.is_playing() && state.total_events > 0 && state.destroyed.len() >= state.total_events {
        state.status = GameStatus::Victory;
        state.powerups.clear();
        state.signals.push(GameSignal::Victory);
        log::info!("Victory! Score {} (final {})", state.score, state.final_score());
    }
}

fn scoring_policy(state: &GameState) -> ScoringPolicy {
    ScoringPolicy::new(state.config.base_score, state.config.combo_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::catalog::{EventBlock, StaticLayout};
    use crate::sim::geometry::Rect;
    use crate::sim::state::SessionOptions;

    const DT: f32 = 1.0 / 60.0;

    fn playing_state(events: Vec<EventBlock>) -> GameState {
        let config = GameConfig {
            powerup_drop_chance: 0.0,
            ..GameConfig::default()
        };
        let mut state = GameState::new(config, events, SessionOptions::default());
        state.start().unwrap();
        state
    }

    fn block(id: &str) -> EventBlock {
        EventBlock::new(id, format!("Event {id}"), "#039be5", 0, 30)
    }

    #[test]
    fn test_idle_and_paused_do_not_move() {
        let layout = StaticLayout::new();
        let mut state = GameState::new(GameConfig::default(), Vec::new(), SessionOptions::default());
        let before = state.ball.clone();
        tick(&mut state, &layout, DT);
        assert_eq!(state.ball, before);
        assert_eq!(state.time_ticks, 0);

        state.start().unwrap();
        state.pause().unwrap();
        tick(&mut state, &layout, DT);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        let start = state.ball.pos;
        tick(&mut state, &layout, DT);
        assert!((state.ball.pos - (start + Vec2::new(5.5, -5.5))).length() < 1e-3);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_left_wall_is_time_column() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        let pf = state.config.playfield;
        state.ball.pos = Vec2::new(pf.time_column_width + 10.0, 400.0);
        state.ball.vel = Vec2::new(-5.0, 2.0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.ball.pos.x, pf.time_column_width + state.ball.radius);
        assert_eq!(state.ball.vel.x, 5.0);
        assert!(state.drain_signals().contains(&GameSignal::WallHit));
    }

    #[test]
    fn test_right_wall_and_ceiling() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        let pf = state.config.playfield;
        state.ball.pos = Vec2::new(pf.width - 10.0, pf.header_height + 10.0);
        state.ball.vel = Vec2::new(5.0, -5.0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.ball.pos.x, pf.width - state.ball.radius);
        assert_eq!(state.ball.pos.y, pf.header_height + state.ball.radius);
        assert_eq!(state.ball.vel, Vec2::new(-5.0, 5.0));
    }

    #[test]
    fn test_paddle_impulse_bounce() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        let paddle = state.paddle.clone();

        // Dead center, falling straight down
        state.ball.pos = Vec2::new(paddle.center_x(), paddle.y - state.ball.radius - 2.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        tick(&mut state, &layout, DT);
        assert_eq!(state.ball.pos.y, paddle.y - state.ball.radius);
        assert_eq!(state.ball.vel, Vec2::new(0.0, -5.0));
        assert!(state.drain_signals().contains(&GameSignal::PaddleHit));

        // Right edge adds +2 to dx
        state.ball.pos = Vec2::new(paddle.x + paddle.width, paddle.y - state.ball.radius - 2.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        tick(&mut state, &layout, DT);
        assert!((state.ball.vel.x - 2.0).abs() < 1e-4);
        assert!(state.ball.vel.y < 0.0);
    }

    #[test]
    fn test_paddle_tolerance_forgives_near_miss() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        let paddle = state.paddle.clone();

        state.ball.pos = Vec2::new(paddle.x - 8.0, paddle.y - state.ball.radius - 2.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        tick(&mut state, &layout, DT);
        assert!(state.ball.vel.y < 0.0);

        // Beyond the tolerance the ball keeps falling
        state.ball.pos = Vec2::new(paddle.x - 20.0, paddle.y - state.ball.radius - 2.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        tick(&mut state, &layout, DT);
        assert!(state.ball.vel.y > 0.0);
    }

    #[test]
    fn test_ball_lost_respawns_and_resets_combo() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        state.combo = 3;
        state.ball.pos = Vec2::new(200.0, state.config.playfield.height + 49.0);
        state.ball.vel = Vec2::new(1.0, 5.0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.lives, 2);
        assert_eq!(state.combo, 0);
        assert_eq!(state.status, GameStatus::Playing);

        let pf = state.config.playfield;
        let speed = state.config.ball_speed;
        assert_eq!(state.ball.pos, Vec2::new(pf.width / 2.0, pf.height - 200.0));
        assert_eq!(state.ball.vel, Vec2::new(speed, -speed));
        assert!(state.drain_signals().contains(&GameSignal::LifeLost { lives_left: 2 }));
    }

    #[test]
    fn test_last_life_is_game_over() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        state.lives = 1;
        state.ball.pos = Vec2::new(200.0, state.config.playfield.height + 60.0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.lives, 0);
        assert_eq!(state.status, GameStatus::GameOver);

        // No further physics
        let ticks = state.time_ticks;
        tick(&mut state, &layout, DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_event_hit_scores_and_reflects() {
        let mut layout = StaticLayout::new();
        layout.insert("a", Rect::new(400.0, 300.0, 100.0, 40.0));
        let mut state = playing_state(vec![block("a"), block("b")]);
        // Just below block "a", moving up into it
        state.ball.pos = Vec2::new(450.0, 351.0);
        state.ball.vel = Vec2::new(0.0, -5.0);

        tick(&mut state, &layout, DT);
        assert!(state.is_destroyed("a"));
        assert_eq!(state.score, 100);
        assert_eq!(state.combo, 1);
        assert!(state.ball.vel.y > 0.0);
        assert!(
            state
                .drain_signals()
                .contains(&GameSignal::EventDestroyed { id: "a".into(), points: 100 })
        );
        // "b" has no geometry, so the game is still on
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_one_block_per_tick_in_catalog_order() {
        let mut layout = StaticLayout::new();
        layout.insert("second", Rect::new(400.0, 300.0, 100.0, 40.0));
        layout.insert("first", Rect::new(400.0, 340.0, 100.0, 40.0));
        let state_events = vec![block("first"), block("second")];
        let mut state = playing_state(state_events);
        // Touching both rects
        state.ball.pos = Vec2::new(450.0, 345.0);
        state.ball.vel = Vec2::new(0.0, 0.0);

        let (index, _) = find_event_hit(&state, &layout).unwrap();
        assert_eq!(index, 0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.destroyed.len(), 1);
        assert!(state.is_destroyed("first"));
    }

    #[test]
    fn test_destroyed_blocks_are_ignored() {
        let mut layout = StaticLayout::new();
        layout.insert("a", Rect::new(400.0, 300.0, 100.0, 40.0));
        let mut state = playing_state(vec![block("a"), block("b")]);
        state.destroyed.insert("a".to_string());
        state.ball.pos = Vec2::new(450.0, 320.0);
        assert!(find_event_hit(&state, &layout).is_none());
    }

    #[test]
    fn test_victory_on_last_block() {
        let mut layout = StaticLayout::new();
        layout.insert("only", Rect::new(400.0, 300.0, 100.0, 40.0));
        let mut state = playing_state(vec![block("only")]);
        state.ball.pos = Vec2::new(450.0, 351.0);
        state.ball.vel = Vec2::new(0.0, -5.0);

        tick(&mut state, &layout, DT);
        assert_eq!(state.status, GameStatus::Victory);
        assert!(state.drain_signals().contains(&GameSignal::Victory));
    }

    #[test]
    fn test_speed_is_clamped_per_axis() {
        let layout = StaticLayout::new();
        let mut state = playing_state(Vec::new());
        state.ball.pos = Vec2::new(500.0, 400.0);
        state.ball.vel = Vec2::new(25.0, -14.0);

        tick(&mut state, &layout, DT);
        let max = state.config.max_speed;
        assert_eq!(state.ball.vel, Vec2::new(max, -max));
    }

    #[test]
    fn test_crawling_ball_lifted_to_min_speed() {
        let mut state = playing_state(Vec::new());
        state.ball.vel = Vec2::new(0.3, -0.4);
        limit_speed(&mut state);
        assert!((state.ball.vel.length() - state.config.min_speed).abs() < 1e-4);
        // Direction kept
        assert!((state.ball.vel.x / state.ball.vel.y - 0.3 / -0.4).abs() < 1e-4);
    }

    #[test]
    fn test_determinism() {
        let mut layout = StaticLayout::new();
        for (i, x) in [200.0, 500.0, 800.0].into_iter().enumerate() {
            layout.insert(i.to_string(), Rect::new(x, 200.0, 150.0, 60.0));
        }
        let events: Vec<EventBlock> = (0..3).map(|i| block(&i.to_string())).collect();
        let config = GameConfig {
            powerup_drop_chance: 1.0,
            ..GameConfig::default()
        };

        let run = || {
            let mut state = GameState::new(config.clone(), events.clone(), SessionOptions::default());
            state.start().unwrap();
            for _ in 0..600 {
                let target = state.ball.pos.x;
                state.set_paddle_target_x(target);
                tick(&mut state, &layout, DT);
            }
            state.snapshot()
        };

        assert_eq!(run(), run());
    }
}
