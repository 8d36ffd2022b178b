//! Pin / drag / release state machine
//!
//! Every ball has a [`DropSession`]. New balls start pinned (`Idle`), may be
//! grabbed with the pointer (`Held`) or nudged with the keyboard, and become
//! `Dropped` once released inside the drop zone. At most one ball is held.
//!
//! The keyboard always drives the *active* ball: the held ball if there is
//! one, otherwise the most recently spawned ball that is still pinned.

use glam::Vec2;

use super::{BallId, BoardConfig, BoardLayout, BodyRegistry};
use crate::consts::*;
use crate::physics::PhysicsEngine;

/// Per-ball interaction state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropSession {
    /// Pinned, waiting to be positioned or dropped
    Idle,
    /// Grabbed by the pointer; `offset` is pointer minus ball centre at grab time
    Held { offset: Vec2 },
    /// Released into free fall
    Dropped,
}

/// Overall interaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    /// No balls at all
    Idle,
    /// At least one pinned ball can be positioned
    Positioning,
    /// Every ball is falling or settled
    Dropped,
}

/// Keyboard nudge direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// What a release attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Ball unpinned and handed to the engine
    Dropped(BallId),
    /// Ball is below the drop zone; it stays pinned
    OutOfZone(BallId),
    /// No pinned ball to release
    NothingPinned,
}

/// Tracks drop sessions for every ball, in spawn order
#[derive(Debug, Default)]
pub struct InteractionMachine {
    sessions: Vec<(BallId, DropSession)>,
    pointer: Option<Vec2>,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.sessions.is_empty() {
            InteractionPhase::Idle
        } else if self.sessions.iter().any(|(_, s)| *s != DropSession::Dropped) {
            InteractionPhase::Positioning
        } else {
            InteractionPhase::Dropped
        }
    }

    pub fn session(&self, id: BallId) -> Option<DropSession> {
        self.sessions.iter().find(|(b, _)| *b == id).map(|(_, s)| *s)
    }

    fn session_mut(&mut self, id: BallId) -> Option<&mut DropSession> {
        self.sessions.iter_mut().find(|(b, _)| *b == id).map(|(_, s)| s)
    }

    /// The ball currently held by the pointer
    pub fn held(&self) -> Option<BallId> {
        self.sessions
            .iter()
            .find(|(_, s)| matches!(s, DropSession::Held { .. }))
            .map(|(id, _)| *id)
    }

    /// The ball keyboard commands apply to
    pub fn active_ball(&self) -> Option<BallId> {
        self.held().or_else(|| {
            self.sessions
                .iter()
                .rev()
                .find(|(_, s)| *s == DropSession::Idle)
                .map(|(id, _)| *id)
        })
    }

    /// Spawn a pinned ball at `position` (clamped into the drop zone)
    pub fn spawn<E: PhysicsEngine + ?Sized>(
        &mut self,
        registry: &mut BodyRegistry,
        engine: &mut E,
        config: &BoardConfig,
        position: Vec2,
    ) -> BallId {
        let position = config.layout().clamp_to_drop_band(position);
        let id = registry.spawn(engine, config, position);
        self.sessions.push((id, DropSession::Idle));
        id
    }

    /// Move the active ball sideways, keeping it inside the drop zone
    pub fn nudge<E: PhysicsEngine + ?Sized>(
        &mut self,
        direction: Direction,
        registry: &mut BodyRegistry,
        engine: &mut E,
        layout: &BoardLayout,
    ) -> Option<Vec2> {
        let id = self.active_ball()?;
        let ball = registry.get_mut(id)?;
        let dx = match direction {
            Direction::Left => -NUDGE_STEP,
            Direction::Right => NUDGE_STEP,
        };
        let position = layout.clamp_to_drop_band(ball.position + Vec2::new(dx, 0.0));
        ball.position = position;
        ball.velocity = Vec2::ZERO;
        engine.set_position(ball.handle, position);
        engine.set_velocity(ball.handle, Vec2::ZERO);
        Some(position)
    }

    /// Grab the nearest pinned ball under the pointer
    pub fn pointer_down(&mut self, pointer: Vec2, registry: &BodyRegistry) -> Option<BallId> {
        let mut best: Option<(BallId, f32, Vec2)> = None;
        for (id, session) in &self.sessions {
            if *session == DropSession::Dropped {
                continue;
            }
            let Some(ball) = registry.get(*id) else {
                continue;
            };
            let dist = pointer.distance(ball.position);
            // Later balls win ties so the newest is grabbed first
            if dist < ball.radius + GRAB_SLOP && best.is_none_or(|(_, d, _)| dist <= d) {
                best = Some((*id, dist, ball.position));
            }
        }

        let (id, _, center) = best?;
        if let Some(previous) = self.held() {
            if let Some(session) = self.session_mut(previous) {
                *session = DropSession::Idle;
            }
        }
        if let Some(session) = self.session_mut(id) {
            *session = DropSession::Held {
                offset: pointer - center,
            };
        }
        self.pointer = Some(pointer);
        Some(id)
    }

    pub fn pointer_move(&mut self, pointer: Vec2) {
        if self.held().is_some() {
            self.pointer = Some(pointer);
        }
    }

    /// Let go of the held ball: drop it if it is in the zone, otherwise it
    /// stays pinned where it is
    pub fn pointer_up<E: PhysicsEngine + ?Sized>(
        &mut self,
        registry: &mut BodyRegistry,
        engine: &mut E,
        layout: &BoardLayout,
    ) -> ReleaseOutcome {
        self.pointer = None;
        let Some(id) = self.held() else {
            return ReleaseOutcome::NothingPinned;
        };
        if let Some(session) = self.session_mut(id) {
            *session = DropSession::Idle;
        }
        self.release_ball(id, registry, engine, layout)
    }

    /// Pull the held ball toward the pointer. Runs before every physics step.
    pub fn before_step<E: PhysicsEngine + ?Sized>(
        &mut self,
        registry: &mut BodyRegistry,
        engine: &mut E,
        layout: &BoardLayout,
    ) {
        let (Some(id), Some(pointer)) = (self.held(), self.pointer) else {
            return;
        };
        let Some(DropSession::Held { offset }) = self.session(id) else {
            return;
        };
        let Some(ball) = registry.get_mut(id) else {
            return;
        };

        let target = layout.clamp_to_drag_area(pointer - offset);
        let pull = (target - ball.position) * DRAG_PULL;
        ball.position += pull;
        ball.velocity = pull;
        engine.set_position(ball.handle, ball.position);
        engine.set_velocity(ball.handle, ball.velocity);
    }

    /// Release the active ball
    pub fn release<E: PhysicsEngine + ?Sized>(
        &mut self,
        registry: &mut BodyRegistry,
        engine: &mut E,
        layout: &BoardLayout,
    ) -> ReleaseOutcome {
        match self.active_ball() {
            Some(id) => self.release_ball(id, registry, engine, layout),
            None => ReleaseOutcome::NothingPinned,
        }
    }

    fn release_ball<E: PhysicsEngine + ?Sized>(
        &mut self,
        id: BallId,
        registry: &mut BodyRegistry,
        engine: &mut E,
        layout: &BoardLayout,
    ) -> ReleaseOutcome {
        let Some(ball) = registry.get_mut(id) else {
            return ReleaseOutcome::NothingPinned;
        };
        if !ball.pinned {
            return ReleaseOutcome::NothingPinned;
        }
        if !layout.in_drop_zone(ball.position.y) {
            log::debug!("Ball {} released below the drop zone, staying pinned", id.0);
            return ReleaseOutcome::OutOfZone(id);
        }

        ball.pinned = false;
        engine.set_static(ball.handle, false);
        engine.set_position(ball.handle, ball.position);
        engine.set_velocity(ball.handle, ball.velocity);

        if let Some(session) = self.session_mut(id) {
            *session = DropSession::Dropped;
        }
        if self.held().is_none() {
            self.pointer = None;
        }
        log::info!("Ball {} dropped at x = {:.1}", id.0, ball.position.x);
        ReleaseOutcome::Dropped(id)
    }

    /// Stop tracking a removed ball
    pub fn forget(&mut self, id: BallId) {
        self.sessions.retain(|(b, _)| *b != id);
        if self.held().is_none() {
            self.pointer = None;
        }
    }

    /// Forget every ball
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.pointer = None;
    }
}
