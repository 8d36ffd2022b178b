//! Board controller
//!
//! Composition root. Owns the engine, the audio sink and every piece of board
//! state, and ties the engine lifecycle to the current [`BoardConfig`]:
//! a config change always detaches (unsubscribe, stop, clear) before the new
//! geometry is loaded and a fresh ball is spawned.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    Ball, BallId, BoardConfig, BoardError, BoardEvent, BoardLayout, BodyRegistry, Direction,
    EventInterpreter, InteractionMachine, InteractionPhase, ReleaseOutcome, StaticBody, WinRecord,
    generate,
};
use crate::audio::ImpactSink;
use crate::consts::*;
use crate::labels::Labels;
use crate::physics::{EngineEvent, EventKind, PhysicsEngine, SubscriptionId};

/// A ball as the presentation layer draws it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub id: BallId,
    pub position: Vec2,
    pub radius: f32,
    pub pinned: bool,
    pub fill: String,
    pub stroke: String,
}

impl From<&Ball> for BallView {
    fn from(ball: &Ball) -> Self {
        Self {
            id: ball.id,
            position: ball.position,
            radius: ball.radius,
            pinned: ball.pinned,
            fill: ball.colors.fill_css(),
            stroke: ball.colors.stroke_css(),
        }
    }
}

/// Read-only view of the whole board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: f32,
    pub height: f32,
    pub drop_zone_height: f32,
    pub statics: Vec<StaticBody>,
    pub balls: Vec<BallView>,
    pub winning_slot: Option<usize>,
}

type WinCallback = Box<dyn FnMut(usize)>;

/// Drives one board on one physics engine
pub struct BoardController<E: PhysicsEngine, A: ImpactSink> {
    config: BoardConfig,
    layout: BoardLayout,
    statics: Vec<StaticBody>,
    engine: E,
    audio: A,
    registry: BodyRegistry,
    interaction: InteractionMachine,
    interpreter: EventInterpreter,
    labels: Labels,
    subscriptions: Vec<SubscriptionId>,
    attached: bool,
    winning_slot: Option<usize>,
    on_win: Option<WinCallback>,
}

impl<E: PhysicsEngine, A: ImpactSink> BoardController<E, A> {
    /// Validate `config` and build a detached controller
    pub fn new(engine: E, audio: A, config: BoardConfig, seed: u64) -> Result<Self, BoardError> {
        let statics = generate(&config)?;
        Ok(Self {
            layout: config.layout(),
            config,
            statics,
            engine,
            audio,
            registry: BodyRegistry::new(seed),
            interaction: InteractionMachine::new(),
            interpreter: EventInterpreter::new(),
            labels: Labels::default(),
            subscriptions: Vec::new(),
            attached: false,
            winning_slot: None,
            on_win: None,
        })
    }

    /// Load the board into the engine, spawn the first ball and start stepping
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.engine.create_world(self.config.gravity);
        for body in &self.statics {
            self.engine.add_body(body.to_spec(&self.config));
        }
        self.subscriptions = vec![
            self.engine.subscribe(EventKind::CollisionStart),
            self.engine.subscribe(EventKind::AfterStep),
        ];
        self.spawn_initial();
        self.engine.run();
        self.attached = true;
        log::info!(
            "Board attached: {}x{} with {} slots, {} peg rows",
            self.config.width,
            self.config.height,
            self.config.slot_count,
            self.config.peg_rows
        );
    }

    /// Tear the board out of the engine. Safe to call any number of times.
    pub fn detach(&mut self) {
        // Listeners go first so nothing fires against cleared state
        for id in self.subscriptions.drain(..) {
            self.engine.unsubscribe(id);
        }
        self.engine.stop();
        self.remove_all_balls();
        self.engine.clear();
        self.interaction.reset();
        self.interpreter.reset();
        self.winning_slot = None;

        if self.attached {
            self.attached = false;
            log::info!("Board detached");
        }
    }

    /// Replace the board parameters. An invalid config leaves the current
    /// board untouched; an identical one is a no-op.
    pub fn set_config(&mut self, config: BoardConfig) -> Result<(), BoardError> {
        if config == self.config {
            return Ok(());
        }
        let statics = generate(&config)?;

        let was_attached = self.attached;
        self.detach();
        self.config = config;
        self.layout = config.layout();
        self.statics = statics;
        log::info!("Board config changed, regenerating");
        if was_attached {
            self.attach();
        }
        Ok(())
    }

    /// Spawn an extra pinned ball near the top centre
    pub fn add_ball(&mut self) -> Option<BallId> {
        if !self.attached {
            return None;
        }
        let x = self.layout.width / 2.0 + self.registry.jitter() * ADD_BALL_JITTER;
        let at = Vec2::new(
            x.clamp(self.layout.min_x(), self.layout.max_x()),
            self.layout.spawn_point().y,
        );
        Some(
            self.interaction
                .spawn(&mut self.registry, &mut self.engine, &self.config, at),
        )
    }

    /// Remove every ball and win, then start over with one pinned ball
    pub fn reset_balls(&mut self) -> Option<BallId> {
        if !self.attached {
            return None;
        }
        self.remove_all_balls();
        self.interaction.reset();
        self.interpreter.reset();
        self.winning_slot = None;
        Some(self.spawn_initial())
    }

    pub fn nudge(&mut self, direction: Direction) -> Option<Vec2> {
        self.interaction
            .nudge(direction, &mut self.registry, &mut self.engine, &self.layout)
    }

    pub fn release(&mut self) -> ReleaseOutcome {
        self.interaction
            .release(&mut self.registry, &mut self.engine, &self.layout)
    }

    pub fn pointer_down(&mut self, pointer: Vec2) -> Option<BallId> {
        self.interaction.pointer_down(pointer, &self.registry)
    }

    pub fn pointer_move(&mut self, pointer: Vec2) {
        self.interaction.pointer_move(pointer);
    }

    pub fn pointer_up(&mut self) -> ReleaseOutcome {
        self.interaction
            .pointer_up(&mut self.registry, &mut self.engine, &self.layout)
    }

    /// Advance one fixed step and interpret what happened
    pub fn tick(&mut self) -> Vec<BoardEvent> {
        if !self.attached {
            return Vec::new();
        }
        self.interaction
            .before_step(&mut self.registry, &mut self.engine, &self.layout);
        self.engine.step();
        let now = self.engine.elapsed_ms();

        let mut events = Vec::new();
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::CollisionStart(pairs) => {
                    let board_events =
                        self.interpreter
                            .interpret(&pairs, now, &self.registry, &mut self.audio);
                    for event in &board_events {
                        if let BoardEvent::Win(record) = event {
                            self.declare_win(record);
                        }
                    }
                    events.extend(board_events);
                }
                EngineEvent::AfterStep => self.registry.sync(&self.engine),
            }
        }
        events
    }

    fn declare_win(&mut self, record: &WinRecord) {
        self.winning_slot = Some(record.slot_index);
        match self.labels.label_for(record.slot_index) {
            Some(label) => log::info!("Decision: {label}"),
            None => log::info!("Decision: slot {}", record.slot_index),
        }
        if let Some(on_win) = self.on_win.as_mut() {
            on_win(record.slot_index);
        }
    }

    fn spawn_initial(&mut self) -> BallId {
        let at = self.layout.spawn_point();
        self.interaction
            .spawn(&mut self.registry, &mut self.engine, &self.config, at)
    }

    fn remove_all_balls(&mut self) {
        for id in self.registry.remove_all(&mut self.engine) {
            self.interpreter.forget(id);
        }
    }

    /// Called with the slot index each time a ball lands
    pub fn set_on_win(&mut self, on_win: impl FnMut(usize) + 'static) {
        self.on_win = Some(Box::new(on_win));
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: Labels) {
        self.labels = labels;
    }

    pub fn winning_slot(&self) -> Option<usize> {
        self.winning_slot
    }

    /// Label of the slot the last ball landed in
    pub fn winning_label(&self) -> Option<&str> {
        self.winning_slot
            .and_then(|slot| self.labels.label_for(slot))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.layout.width,
            height: self.layout.height,
            drop_zone_height: self.layout.drop_zone_height,
            statics: self.statics.clone(),
            balls: self
                .registry
                .active_balls()
                .iter()
                .map(BallView::from)
                .collect(),
            winning_slot: self.winning_slot,
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        self.interaction.phase()
    }

    pub fn balls(&self) -> &[Ball] {
        self.registry.active_balls()
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl<E: PhysicsEngine, A: ImpactSink> Drop for BoardController<E, A> {
    fn drop(&mut self) {
        self.detach();
    }
}
