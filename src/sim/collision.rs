//! Collision detection and response for the ball
//!
//! Everything on the field is an axis-aligned rectangle (walls, paddle,
//! event blocks) and the ball is a circle, so detection reduces to a
//! closest-point test against the rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, Rect};
use crate::consts::{COLLISION_DAMPING, PADDLE_EDGE_SPEED_BOOST};

/// Rectangle side struck by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Result of a collision check
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the rectangle to the circle center
    pub point: Vec2,
    /// Unit surface normal pointing from the rectangle toward the ball
    pub normal: Vec2,
    /// Side classification (approximate at corners, see `check_circle_rect_collision`)
    pub side: Option<Side>,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            side: None,
            penetration: 0.0,
        }
    }
}

/// Unit vector in the direction of `v`, or zero for a zero-length vector
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n. `normal` must be unit length.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Side classification tolerance for points on the rectangle boundary
const SIDE_EPSILON: f32 = 0.001;

/// Check collision between a circle and a rectangle
///
/// Tangent contact (distance exactly equal to the radius) is not a hit.
/// When the circle center lies inside the rectangle the normal points out
/// through the nearest edge, ties resolved left, right, top, bottom.
///
/// The side reported for an outside hit comes from which boundary the
/// closest point lies on, checked in the same order; a corner contact is
/// reported as the first matching side even when it is struck diagonally.
pub fn check_circle_rect_collision(circle: &Circle, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(circle.center);
    let offset = circle.center - closest;
    let distance_sq = offset.length_squared();

    if distance_sq >= circle.radius * circle.radius {
        return CollisionResult::miss();
    }

    let distance = distance_sq.sqrt();

    let (normal, side) = if rect.contains_point(circle.center) {
        // Deep penetration or tunneling: push out through the nearest edge
        let c = circle.center;
        let to_left = c.x - rect.left();
        let to_right = rect.right() - c.x;
        let to_top = c.y - rect.top();
        let to_bottom = rect.bottom() - c.y;
        let min = to_left.min(to_right).min(to_top).min(to_bottom);

        if min == to_left {
            (Vec2::new(-1.0, 0.0), Side::Left)
        } else if min == to_right {
            (Vec2::new(1.0, 0.0), Side::Right)
        } else if min == to_top {
            (Vec2::new(0.0, -1.0), Side::Top)
        } else {
            (Vec2::new(0.0, 1.0), Side::Bottom)
        }
    } else if distance == 0.0 {
        // Degenerate: default to pushing the ball up
        (Vec2::new(0.0, -1.0), Side::Top)
    } else {
        let side = if (closest.x - rect.left()).abs() < SIDE_EPSILON {
            Side::Left
        } else if (closest.x - rect.right()).abs() < SIDE_EPSILON {
            Side::Right
        } else if (closest.y - rect.top()).abs() < SIDE_EPSILON {
            Side::Top
        } else {
            Side::Bottom
        };
        (normalize(offset), side)
    };

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        side: Some(side),
        penetration: circle.radius - distance,
    }
}

/// Push the ball out of the obstacle and bounce it
///
/// Returns the corrected `(position, velocity)`. The position moves along
/// the normal by the penetration depth so the same contact does not
/// re-trigger next tick; the velocity is reflected and damped.
pub fn apply_collision_response(pos: Vec2, vel: Vec2, collision: &CollisionResult) -> (Vec2, Vec2) {
    if !collision.hit {
        return (pos, vel);
    }

    let mut pos = pos;
    if collision.penetration > 0.0 {
        pos += collision.normal * collision.penetration;
    }

    let vel = reflect_velocity(vel, collision.normal) * COLLISION_DAMPING;
    (pos, vel)
}

/// Angle-based paddle bounce
///
/// Maps where the ball struck across the paddle to a launch angle within
/// `max_angle` of straight up, keeps the current speed and adds up to 15%
/// more at the edges. The main loop uses the cheaper impulse bounce in
/// `tick`; this is the alternate model.
pub fn calculate_paddle_reflection(
    ball_x: f32,
    paddle_x: f32,
    paddle_width: f32,
    velocity: Vec2,
    max_angle: f32,
) -> Vec2 {
    let hit_position = ((ball_x - paddle_x) / paddle_width).clamp(0.0, 1.0);
    // -1 at the left edge, 0 at the center, 1 at the right edge
    let normalized = (hit_position - 0.5) * 2.0;

    let angle = -std::f32::consts::FRAC_PI_2 + normalized * max_angle;
    let speed = velocity.length() * (1.0 + normalized.abs() * PADDLE_EDGE_SPEED_BOOST);

    Vec2::new(angle.cos(), angle.sin()) * speed
}

/// Strict AABB overlap (touching edges do not overlap)
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Swept test: will a ball moving at `vel` for `dt` reach `rect`?
///
/// Casts the center along the velocity against the rectangle grown by the
/// radius. Returns the time of impact as a fraction of the step in `[0, 1]`.
pub fn predict_collision(pos: Vec2, vel: Vec2, radius: f32, rect: &Rect, dt: f32) -> Option<f32> {
    let ray = vel * dt;
    let ray_length = ray.length();
    if ray_length == 0.0 {
        return None;
    }
    let dir = ray / ray_length;
    let target = rect.expanded(radius);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for (origin, d, lo, hi) in [
        (pos.x, dir.x, target.left(), target.right()),
        (pos.y, dir.y, target.top(), target.bottom()),
    ] {
        if d == 0.0 {
            // Parallel to this slab: must already be inside it
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - origin) / d;
        let t2 = (hi - origin) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < 0.0 || t_min > t_max || t_min > ray_length {
        return None;
    }

    Some(t_min.max(0.0) / ray_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_PADDLE_ANGLE;
    use proptest::prelude::*;

    fn rect() -> Rect {
        Rect::new(100.0, 100.0, 80.0, 40.0)
    }

    #[test]
    fn test_circle_rect_miss() {
        let result = check_circle_rect_collision(&Circle::new(50.0, 50.0, 8.0), &rect());
        assert!(!result.hit);
        assert_eq!(result.side, None);
    }

    #[test]
    fn test_tangent_contact_is_not_a_hit() {
        // Exactly one radius above the top edge
        let result = check_circle_rect_collision(&Circle::new(140.0, 92.0, 8.0), &rect());
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_rect_top_hit() {
        let result = check_circle_rect_collision(&Circle::new(140.0, 95.0, 8.0), &rect());
        assert!(result.hit);
        assert_eq!(result.side, Some(Side::Top));
        assert!((result.normal - Vec2::new(0.0, -1.0)).length() < 1e-6);
        assert!((result.penetration - 3.0).abs() < 1e-5);
        assert_eq!(result.point, Vec2::new(140.0, 100.0));
    }

    #[test]
    fn test_circle_rect_left_and_right_hits() {
        let left = check_circle_rect_collision(&Circle::new(95.0, 120.0, 8.0), &rect());
        assert_eq!(left.side, Some(Side::Left));
        assert!(left.normal.x < 0.0);

        let right = check_circle_rect_collision(&Circle::new(185.0, 120.0, 8.0), &rect());
        assert_eq!(right.side, Some(Side::Right));
        assert!(right.normal.x > 0.0);

        let bottom = check_circle_rect_collision(&Circle::new(140.0, 145.0, 8.0), &rect());
        assert_eq!(bottom.side, Some(Side::Bottom));
        assert!(bottom.normal.y > 0.0);
    }

    #[test]
    fn test_corner_hit_reports_first_matching_side() {
        // Diagonal approach to the top-left corner is classified as Left
        let result = check_circle_rect_collision(&Circle::new(96.0, 96.0, 8.0), &rect());
        assert!(result.hit);
        assert_eq!(result.side, Some(Side::Left));
        let diag = Vec2::new(-1.0, -1.0).normalize();
        assert!((result.normal - diag).length() < 1e-5);
    }

    #[test]
    fn test_center_inside_uses_nearest_edge() {
        // 2px from the bottom edge, far from the others
        let result = check_circle_rect_collision(&Circle::new(140.0, 138.0, 8.0), &rect());
        assert!(result.hit);
        assert_eq!(result.side, Some(Side::Bottom));
        assert_eq!(result.normal, Vec2::new(0.0, 1.0));
        assert_eq!(result.penetration, 8.0);
    }

    #[test]
    fn test_center_inside_tie_prefers_left() {
        let square = Rect::new(0.0, 0.0, 20.0, 20.0);
        let result = check_circle_rect_collision(&Circle::new(10.0, 10.0, 4.0), &square);
        assert_eq!(result.side, Some(Side::Left));
        assert_eq!(result.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
        assert!((normalize(Vec2::new(3.0, 4.0)) - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_collision_response_pushes_out_and_damps() {
        let collision = check_circle_rect_collision(&Circle::new(140.0, 95.0, 8.0), &rect());
        let (pos, vel) = apply_collision_response(Vec2::new(140.0, 95.0), Vec2::new(2.0, 4.0), &collision);

        assert!((pos.y - 92.0).abs() < 1e-5);
        assert!((vel.x - 2.0 * COLLISION_DAMPING).abs() < 1e-6);
        assert!((vel.y - (-4.0 * COLLISION_DAMPING)).abs() < 1e-6);
    }

    #[test]
    fn test_collision_response_ignores_miss() {
        let (pos, vel) = apply_collision_response(Vec2::ONE, Vec2::X, &CollisionResult::miss());
        assert_eq!(pos, Vec2::ONE);
        assert_eq!(vel, Vec2::X);
    }

    #[test]
    fn test_paddle_reflection_center_goes_straight_up() {
        let speed = 6.0;
        let vel = calculate_paddle_reflection(160.0, 100.0, 120.0, Vec2::new(0.0, speed), MAX_PADDLE_ANGLE);
        assert!(vel.x.abs() < 1e-4);
        assert!((vel.y + speed).abs() < 1e-4);
        assert!((vel.length() - speed).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_reflection_edge_boost() {
        let max_angle = MAX_PADDLE_ANGLE;
        let vel = calculate_paddle_reflection(220.0, 100.0, 120.0, Vec2::new(0.0, 5.0), max_angle);
        // Right edge: 60 degrees right of straight up, 15% faster
        assert!(vel.x > 0.0 && vel.y < 0.0);
        assert!((vel.length() - 5.0 * 1.15).abs() < 1e-4);
        assert!((vel.x.atan2(-vel.y) - max_angle).abs() < 1e-4);

        // Off the paddle entirely clamps to the edge
        let clamped = calculate_paddle_reflection(10.0, 100.0, 120.0, Vec2::new(0.0, 5.0), max_angle);
        assert!(clamped.x < 0.0);
        assert!((clamped.length() - 5.0 * 1.15).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!aabb_overlap(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!aabb_overlap(&a, &Rect::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_predict_collision() {
        let r = rect();
        // Falling onto the top edge from 20px above, 30px of travel this step
        let toi = predict_collision(Vec2::new(140.0, 72.0), Vec2::new(0.0, 30.0), 8.0, &r, 1.0)
            .expect("should collide");
        assert!((toi - 20.0 / 30.0).abs() < 1e-4);

        // Too slow to reach it this step
        assert!(predict_collision(Vec2::new(140.0, 72.0), Vec2::new(0.0, 10.0), 8.0, &r, 1.0).is_none());
        // Moving away
        assert!(predict_collision(Vec2::new(140.0, 72.0), Vec2::new(0.0, -30.0), 8.0, &r, 1.0).is_none());
        // Parallel and outside the slab
        assert!(predict_collision(Vec2::new(10.0, 72.0), Vec2::new(0.0, 30.0), 8.0, &r, 1.0).is_none());
        // Stationary
        assert!(predict_collision(Vec2::new(140.0, 72.0), Vec2::ZERO, 8.0, &r, 1.0).is_none());
    }

    /// Brute-force oracle: does any sampled rectangle point lie strictly inside the circle?
    /// Returns the answer and the worst-case distance from any rect point to its nearest sample.
    fn sampled_overlap(circle: &Circle, rect: &Rect) -> (bool, f32) {
        const SAMPLES: usize = 64;
        let sx = rect.width / SAMPLES as f32;
        let sy = rect.height / SAMPLES as f32;
        let mut found = false;
        for i in 0..=SAMPLES {
            for j in 0..=SAMPLES {
                let p = rect.closest_point(Vec2::new(rect.x + sx * i as f32, rect.y + sy * j as f32));
                if (p - circle.center).length() < circle.radius {
                    found = true;
                }
            }
        }
        (found, Vec2::new(sx, sy).length() / 2.0)
    }

    proptest! {
        #[test]
        fn prop_hit_matches_sampling_oracle(
            cx in -50.0f32..250.0,
            cy in -50.0f32..250.0,
            radius in 1.0f32..40.0,
            x in 0.0f32..100.0,
            y in 0.0f32..100.0,
            w in 1.0f32..100.0,
            h in 1.0f32..100.0,
        ) {
            let circle = Circle::new(cx, cy, radius);
            let rect = Rect::new(x, y, w, h);
            let result = check_circle_rect_collision(&circle, &rect);
            let (sampled, spacing) = sampled_overlap(&circle, &rect);

            // Any sampled point inside the circle proves intersection
            if sampled {
                prop_assert!(result.hit);
            }
            // A hit deeper than the sample spacing must be visible to the oracle
            if result.hit && result.penetration > spacing + 1e-3 {
                prop_assert!(sampled);
            }
            if result.hit {
                prop_assert!(result.penetration >= 0.0);
                prop_assert!((result.normal.length() - 1.0).abs() < 1e-3);
            }
        }
    }
}
