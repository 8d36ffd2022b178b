//! Contact tests between a circle and the board's static shapes
//!
//! Everything dynamic on the board is a ball, so every test has a circle on
//! one side. Normals point from the other body toward the circle.

use glam::Vec2;

use super::Shape;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at contact, pointing toward the circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle against circle
pub fn circle_circle_collision(
    pos: Vec2,
    radius: f32,
    other_pos: Vec2,
    other_radius: f32,
) -> CollisionResult {
    let delta = pos - other_pos;
    let dist = delta.length();
    let reach = radius + other_radius;
    if dist >= reach {
        return CollisionResult::miss();
    }

    // Concentric circles: push straight up
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::NEG_Y };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Circle against an axis-aligned rectangle
pub fn circle_rect_collision(pos: Vec2, radius: f32, rect_pos: Vec2, half: Vec2) -> CollisionResult {
    let local = pos - rect_pos;
    let closest = local.clamp(-half, half);
    let delta = local - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Centre inside the rectangle: exit through the nearest face
    let to_right = half.x - local.x;
    let to_left = half.x + local.x;
    let to_bottom = half.y - local.y;
    let to_top = half.y + local.y;
    let min_x = to_right.min(to_left);
    let min_y = to_bottom.min(to_top);

    let (normal, depth) = if min_x < min_y {
        if to_right < to_left {
            (Vec2::X, to_right)
        } else {
            (Vec2::NEG_X, to_left)
        }
    } else if to_bottom < to_top {
        (Vec2::Y, to_bottom)
    } else {
        (Vec2::NEG_Y, to_top)
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: depth + radius,
    }
}

/// Circle against any shape
pub fn circle_shape_collision(
    pos: Vec2,
    radius: f32,
    shape: &Shape,
    shape_pos: Vec2,
) -> CollisionResult {
    match *shape {
        Shape::Circle { radius: r } => circle_circle_collision(pos, radius, shape_pos, r),
        Shape::Rect { half } => circle_rect_collision(pos, radius, shape_pos, half),
    }
}

/// Whether two shapes share a region of positive area.
///
/// Shapes that merely touch along an edge or at a point do not overlap;
/// `tolerance` absorbs floating-point noise at such seams.
pub fn shapes_overlap(a: &Shape, a_pos: Vec2, b: &Shape, b_pos: Vec2, tolerance: f32) -> bool {
    match (*a, *b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            a_pos.distance(b_pos) < ra + rb - tolerance
        }
        (Shape::Circle { radius }, Shape::Rect { half }) => {
            let result = circle_rect_collision(a_pos, radius, b_pos, half);
            result.hit && result.penetration > tolerance
        }
        (Shape::Rect { .. }, Shape::Circle { .. }) => shapes_overlap(b, b_pos, a, a_pos, tolerance),
        (Shape::Rect { half: ha }, Shape::Rect { half: hb }) => {
            let gap = (a_pos - b_pos).abs() - (ha + hb);
            gap.x < -tolerance && gap.y < -tolerance
        }
    }
}

/// Velocity after hitting an immovable surface.
///
/// The normal component bounces with `restitution` unless it is slower than
/// `rest_speed`, in which case it is removed so resting balls settle. The
/// tangential component loses `friction` of its magnitude.
pub fn bounce_velocity(
    velocity: Vec2,
    normal: Vec2,
    restitution: f32,
    friction: f32,
    rest_speed: f32,
) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        // Already separating
        return velocity;
    }
    let normal_part = normal * vn;
    let tangent_part = velocity - normal_part;
    let bounced = if -vn < rest_speed {
        Vec2::ZERO
    } else {
        -normal_part * restitution
    };
    bounced + tangent_part * (1.0 - friction.clamp(0.0, 1.0))
}
