//! Built-in rigid-body world
//!
//! Small fixed-step engine: circles fall under gravity and bounce off static
//! circles and axis-aligned rectangles. Good enough to look plausible on a
//! peg board; not a general solver.
//!
//! Deterministic: bodies live in a `BTreeMap` so iteration follows handle order.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use super::collision::{bounce_velocity, circle_circle_collision, circle_shape_collision};
use super::{
    BodyHandle, BodyLabel, BodySpec, BodyState, CollisionPair, EngineEvent, EventKind,
    PhysicsEngine, Shape, SubscriptionId,
};
use crate::consts::*;

/// Normal speed (px/step) below which contacts stop bouncing
const REST_SPEED: f32 = 0.5;

/// Farthest a body may travel in one substep, as a fraction of its radius.
/// Below one radius a circle cannot pass through any static body, and the cap
/// bounds the energy restitution above 1 can add.
const MAX_SUBSTEP_TRAVEL: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
struct Body {
    label: BodyLabel,
    shape: Shape,
    position: Vec2,
    velocity: Vec2,
    is_static: bool,
    is_sensor: bool,
    restitution: f32,
    friction: f32,
    air_friction: f32,
}

impl Body {
    fn from_spec(spec: BodySpec) -> Self {
        Self {
            label: spec.label,
            shape: spec.shape,
            position: spec.position,
            velocity: Vec2::ZERO,
            is_static: spec.is_static,
            is_sensor: spec.is_sensor,
            restitution: spec.restitution,
            friction: spec.friction,
            air_friction: spec.air_friction,
        }
    }

    fn is_dynamic(&self) -> bool {
        !self.is_static && !self.is_sensor
    }

    /// Collision radius used when this body is the moving side
    fn radius(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Rect { half } => half.length(),
        }
    }

    /// Speed limit in px per step
    fn max_speed(&self) -> f32 {
        self.radius() * MAX_SUBSTEP_TRAVEL * SUBSTEPS as f32
    }

    fn snapshot(&self, handle: BodyHandle) -> BodyState {
        BodyState {
            handle,
            velocity: self.velocity,
        }
    }
}

fn pair_key(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a < b { (a, b) } else { (b, a) }
}

/// Fixed-step 2D world
#[derive(Debug, Default)]
pub struct World {
    gravity: f32,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
    subscriptions: Vec<(SubscriptionId, EventKind)>,
    next_subscription: u32,
    events: Vec<EngineEvent>,
    /// Pairs in contact at the end of the previous step
    contacts: HashSet<(BodyHandle, BodyHandle)>,
    running: bool,
    elapsed_ms: f64,
}

impl World {
    pub fn new(gravity: f32) -> Self {
        let mut world = Self::default();
        world.create_world(gravity);
        world
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.iter().any(|(_, k)| *k == kind)
    }

    /// Resolve one contact for the dynamic body `handle` against `other`.
    /// Returns the pre-resolution pair when the bodies touch.
    fn resolve_contact(
        &mut self,
        handle: BodyHandle,
        other_handle: BodyHandle,
    ) -> Option<CollisionPair> {
        let body = *self.bodies.get(&handle)?;
        let other = *self.bodies.get(&other_handle)?;

        let result = circle_shape_collision(body.position, body.radius(), &other.shape, other.position);
        if !result.hit {
            return None;
        }

        let pair = CollisionPair {
            kind_a: body.label,
            kind_b: other.label,
            body_a: body.snapshot(handle),
            body_b: other.snapshot(other_handle),
        };

        if other.is_sensor {
            return Some(pair);
        }

        let restitution = body.restitution.max(other.restitution);
        let friction = body.friction.min(other.friction);

        if other.is_dynamic() {
            let result = circle_circle_collision(body.position, body.radius(), other.position, other.radius());
            let n = result.normal;
            let correction = n * (result.penetration / 2.0);
            let vn = (body.velocity - other.velocity).dot(n);
            let impulse = if vn < 0.0 {
                n * (-(1.0 + restitution) * vn / 2.0)
            } else {
                Vec2::ZERO
            };
            if let Some(a) = self.bodies.get_mut(&handle) {
                a.position += correction;
                a.velocity += impulse;
            }
            if let Some(b) = self.bodies.get_mut(&other_handle) {
                b.position -= correction;
                b.velocity -= impulse;
            }
        } else if let Some(a) = self.bodies.get_mut(&handle) {
            a.position += result.normal * result.penetration;
            a.velocity = bounce_velocity(a.velocity, result.normal, restitution, friction, REST_SPEED);
        }

        Some(pair)
    }
}

impl PhysicsEngine for World {
    fn create_world(&mut self, gravity: f32) {
        self.gravity = gravity;
        self.bodies.clear();
        self.subscriptions.clear();
        self.events.clear();
        self.contacts.clear();
        self.running = false;
        self.elapsed_ms = 0.0;
    }

    fn add_body(&mut self, spec: BodySpec) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, Body::from_spec(spec));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if self.bodies.remove(&handle).is_some() {
            self.contacts.retain(|(a, b)| *a != handle && *b != handle);
        }
    }

    fn set_static(&mut self, handle: BodyHandle, is_static: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.is_static = is_static;
            if is_static {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.position)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }

    fn label(&self, handle: BodyHandle) -> Option<BodyLabel> {
        self.bodies.get(&handle).map(|b| b.label)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn subscribe(&mut self, kind: EventKind) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push((id, kind));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|(sub, _)| *sub != id);
        let subscribed: Vec<EventKind> = self.subscriptions.iter().map(|(_, k)| *k).collect();
        self.events.retain(|e| subscribed.contains(&e.kind()));
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn run(&mut self) {
        self.running = true;
    }

    fn step(&mut self) {
        if !self.running {
            return;
        }

        let dynamic: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(h, _)| *h)
            .collect();
        let all: Vec<BodyHandle> = self.bodies.keys().copied().collect();

        let gravity_step = Vec2::new(0.0, self.gravity * GRAVITY_SCALE * STEP_MS * STEP_MS);
        for handle in &dynamic {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.velocity += gravity_step;
                body.velocity *= 1.0 - body.air_friction;
            }
        }

        let mut touching = HashSet::new();
        let mut started = Vec::new();
        let substeps = SUBSTEPS as f32;

        for _ in 0..SUBSTEPS {
            for handle in &dynamic {
                if let Some(body) = self.bodies.get_mut(handle) {
                    body.velocity = body.velocity.clamp_length_max(body.max_speed());
                    body.position += body.velocity / substeps;
                }
            }

            for &handle in &dynamic {
                for &other in &all {
                    if other == handle {
                        continue;
                    }
                    // Ball-ball pairs are handled once, from the lower handle
                    let other_dynamic = self.bodies.get(&other).is_some_and(|b| b.is_dynamic());
                    if other_dynamic && other < handle {
                        continue;
                    }

                    let Some(pair) = self.resolve_contact(handle, other) else {
                        continue;
                    };
                    let key = pair_key(handle, other);
                    if touching.insert(key) && !self.contacts.contains(&key) {
                        started.push(pair);
                    }
                }
            }
        }

        for handle in &dynamic {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.velocity = body.velocity.clamp_length_max(body.max_speed());
            }
        }

        self.contacts = touching;
        self.elapsed_ms += STEP_MS as f64;

        if !started.is_empty() && self.is_subscribed(EventKind::CollisionStart) {
            self.events.push(EngineEvent::CollisionStart(started));
        }
        if self.is_subscribed(EventKind::AfterStep) {
            self.events.push(EngineEvent::AfterStep);
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
        self.events.clear();
    }

    fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}
