//! Physics engine boundary
//!
//! The board core never resolves contacts itself. It configures bodies through
//! [`PhysicsEngine`] and reacts to the typed events the engine queues. [`World`]
//! is a small built-in engine implementing the same trait so the board runs
//! natively and in tests without a browser.

pub mod collision;
pub mod world;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::board::BallId;

pub use collision::{CollisionResult, circle_circle_collision, circle_rect_collision, shapes_overlap};
pub use world::World;

/// Opaque engine-side body identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Identity of an event subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// Body shape. Rectangles are axis-aligned and described by half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half: Vec2 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    /// Axis-aligned bounds of the shape centred at `pos`
    pub fn bounds(&self, pos: Vec2) -> (Vec2, Vec2) {
        match *self {
            Shape::Circle { radius } => (pos - Vec2::splat(radius), pos + Vec2::splat(radius)),
            Shape::Rect { half } => (pos - half, pos + half),
        }
    }
}

/// What a body is, as far as the board is concerned.
///
/// `Internal` covers engine helpers (constraints, probes) the board does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyLabel {
    Ball(BallId),
    Wall,
    Peg,
    Divider,
    SlotSensor(usize),
    Internal,
}

impl BodyLabel {
    pub fn ball_id(&self) -> Option<BallId> {
        match self {
            BodyLabel::Ball(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_sensor(&self) -> bool {
        matches!(self, BodyLabel::SlotSensor(_))
    }
}

/// Everything the engine needs to create a body
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub label: BodyLabel,
    pub shape: Shape,
    pub position: Vec2,
    pub is_static: bool,
    pub is_sensor: bool,
    pub restitution: f32,
    pub friction: f32,
    pub air_friction: f32,
}

impl BodySpec {
    /// Immovable solid body
    pub fn fixed(label: BodyLabel, shape: Shape, position: Vec2) -> Self {
        Self {
            label,
            shape,
            position,
            is_static: true,
            is_sensor: false,
            restitution: 0.0,
            friction: 0.1,
            air_friction: 0.0,
        }
    }

    /// Overlap-only body, never affects dynamics
    pub fn sensor(label: BodyLabel, shape: Shape, position: Vec2) -> Self {
        Self {
            is_sensor: true,
            ..Self::fixed(label, shape, position)
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// Event kinds a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CollisionStart,
    AfterStep,
}

/// One side of a collision pair, captured before the contact is resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub handle: BodyHandle,
    pub velocity: Vec2,
}

/// Two bodies that started touching during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    pub kind_a: BodyLabel,
    pub kind_b: BodyLabel,
    pub body_a: BodyState,
    pub body_b: BodyState,
}

impl CollisionPair {
    /// The pair with sides swapped
    pub fn flipped(&self) -> Self {
        Self {
            kind_a: self.kind_b,
            kind_b: self.kind_a,
            body_a: self.body_b,
            body_b: self.body_a,
        }
    }
}

/// Events queued by the engine for subscribed kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    CollisionStart(Vec<CollisionPair>),
    AfterStep,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::CollisionStart(_) => EventKind::CollisionStart,
            EngineEvent::AfterStep => EventKind::AfterStep,
        }
    }
}

/// Capabilities the board needs from a 2D rigid-body engine.
///
/// Teardown operations (`remove_body`, `stop`, `clear`, `unsubscribe`) must be
/// idempotent and never fail on empty state.
pub trait PhysicsEngine {
    /// Reset to an empty world with the given gravity
    fn create_world(&mut self, gravity: f32);
    fn add_body(&mut self, spec: BodySpec) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);
    fn set_static(&mut self, handle: BodyHandle, is_static: bool);
    fn set_position(&mut self, handle: BodyHandle, position: Vec2);
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;
    fn label(&self, handle: BodyHandle) -> Option<BodyLabel>;
    fn body_count(&self) -> usize;

    fn subscribe(&mut self, kind: EventKind) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
    /// Take every event queued since the last drain
    fn drain_events(&mut self) -> Vec<EngineEvent>;

    /// Start accepting `step` calls
    fn run(&mut self);
    /// Advance one fixed step (no-op while stopped)
    fn step(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Remove every body and pending event
    fn clear(&mut self);
    /// Simulation time since `create_world`
    fn elapsed_ms(&self) -> f64;
}
