//! Collision stream interpretation
//!
//! Turns the engine's `collisionStart` pairs into board events:
//! - impact knocks, throttled per ball so a peg cascade does not flood audio
//! - win declarations, at most one per ball until the ball is removed

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BallId, BoardError, BodyRegistry};
use crate::audio::ImpactSink;
use crate::consts::*;
use crate::physics::{BodyLabel, CollisionPair};

/// A ball landing in a slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinRecord {
    pub ball: BallId,
    pub slot_index: usize,
    /// Simulation time of the first sensor contact (ms)
    pub timestamp: f64,
}

/// Events raised while interpreting a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardEvent {
    Impact { ball: BallId, intensity: f32 },
    Win(WinRecord),
}

/// Last impact-feedback time per ball
#[derive(Debug, Clone)]
pub struct CollisionDebounceTable {
    last: HashMap<BallId, f64>,
    window_ms: f64,
}

impl Default for CollisionDebounceTable {
    fn default() -> Self {
        Self::new(IMPACT_DEBOUNCE_MS)
    }
}

impl CollisionDebounceTable {
    pub fn new(window_ms: f64) -> Self {
        Self {
            last: HashMap::new(),
            window_ms,
        }
    }

    /// Whether feedback for `ball` may fire at `now`
    pub fn ready(&self, ball: BallId, now: f64) -> bool {
        self.last
            .get(&ball)
            .is_none_or(|last| now - last > self.window_ms)
    }

    pub fn record(&mut self, ball: BallId, now: f64) {
        self.last.insert(ball, now);
    }

    pub fn prune(&mut self, ball: BallId) {
        self.last.remove(&ball);
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

/// How a pair was classified
enum Contact {
    /// A ball hit something solid; carries the ball speed at impact
    Solid { ball: BallId, speed: f32 },
    /// A ball entered a slot sensor
    Slot { ball: BallId, slot_index: usize },
    /// Nothing the board cares about
    Ignored,
}

/// Interprets collision pairs for one board
#[derive(Debug, Default)]
pub struct EventInterpreter {
    debounce: CollisionDebounceTable,
    wins: HashMap<BallId, WinRecord>,
}

impl EventInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle every pair from one step
    pub fn interpret<A: ImpactSink + ?Sized>(
        &mut self,
        pairs: &[CollisionPair],
        now: f64,
        registry: &BodyRegistry,
        audio: &mut A,
    ) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        for pair in pairs {
            match self.interpret_pair(pair, now, registry, audio) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) => log::trace!("Ignoring collision: {err}"),
            }
        }
        events
    }

    /// Handle one pair. Unknown balls are reported as
    /// [`BoardError::UnknownBodyReference`] for the caller to drop.
    pub fn interpret_pair<A: ImpactSink + ?Sized>(
        &mut self,
        pair: &CollisionPair,
        now: f64,
        registry: &BodyRegistry,
        audio: &mut A,
    ) -> Result<Option<BoardEvent>, BoardError> {
        for (label, body) in [(pair.kind_a, pair.body_a), (pair.kind_b, pair.body_b)] {
            if let BodyLabel::Ball(id) = label {
                if !registry.contains(id) {
                    return Err(BoardError::UnknownBodyReference(body.handle));
                }
            }
        }

        match classify(pair) {
            Contact::Solid { ball, speed } => Ok(self.impact(ball, speed, now, audio)),
            Contact::Slot { ball, slot_index } => Ok(self.win(ball, slot_index, now)),
            Contact::Ignored => Ok(None),
        }
    }

    fn impact<A: ImpactSink + ?Sized>(
        &mut self,
        ball: BallId,
        speed: f32,
        now: f64,
        audio: &mut A,
    ) -> Option<BoardEvent> {
        if !self.debounce.ready(ball, now) {
            return None;
        }
        let intensity = (speed / IMPACT_FULL_SPEED).min(1.0);
        if let Err(err) = audio.play_impact(intensity) {
            log::debug!("Impact sound failed: {err}");
        }
        self.debounce.record(ball, now);
        Some(BoardEvent::Impact { ball, intensity })
    }

    fn win(&mut self, ball: BallId, slot_index: usize, now: f64) -> Option<BoardEvent> {
        if self.wins.contains_key(&ball) {
            return None;
        }
        let record = WinRecord {
            ball,
            slot_index,
            timestamp: now,
        };
        self.wins.insert(ball, record);
        log::info!("Ball {} landed in slot {}", ball.0, slot_index);
        Some(BoardEvent::Win(record))
    }

    pub fn win_for(&self, ball: BallId) -> Option<&WinRecord> {
        self.wins.get(&ball)
    }

    pub fn debounce(&self) -> &CollisionDebounceTable {
        &self.debounce
    }

    /// Drop all state for a removed ball
    pub fn forget(&mut self, ball: BallId) {
        self.debounce.prune(ball);
        self.wins.remove(&ball);
    }

    pub fn reset(&mut self) {
        self.debounce.clear();
        self.wins.clear();
    }
}

fn classify(pair: &CollisionPair) -> Contact {
    use BodyLabel::*;

    match (pair.kind_a, pair.kind_b) {
        (Ball(ball), SlotSensor(slot_index)) | (SlotSensor(slot_index), Ball(ball)) => {
            Contact::Slot { ball, slot_index }
        }
        // Ball against ball is not "exactly one ball"
        (Ball(_), Ball(_)) => Contact::Ignored,
        (Ball(ball), Wall | Peg | Divider) => Contact::Solid {
            ball,
            speed: pair.body_a.velocity.length(),
        },
        (Wall | Peg | Divider, Ball(ball)) => Contact::Solid {
            ball,
            speed: pair.body_b.velocity.length(),
        },
        _ => Contact::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::board::BoardConfig;
    use crate::physics::{BodyHandle, BodyState, World};
    use glam::Vec2;

    struct Rig {
        interpreter: EventInterpreter,
        registry: BodyRegistry,
        audio: RecordingAudio,
        ball: BallId,
        handle: BodyHandle,
    }

    impl Rig {
        fn new() -> Self {
            let mut world = World::new(1.0);
            let mut registry = BodyRegistry::new(3);
            let ball = registry.spawn(&mut world, &BoardConfig::default(), Vec2::new(300.0, 50.0));
            let handle = registry.get(ball).unwrap().handle;
            Self {
                interpreter: EventInterpreter::new(),
                registry,
                audio: RecordingAudio::default(),
                ball,
                handle,
            }
        }

        fn pair(&self, other: BodyLabel, velocity: Vec2) -> CollisionPair {
            CollisionPair {
                kind_a: BodyLabel::Ball(self.ball),
                kind_b: other,
                body_a: BodyState {
                    handle: self.handle,
                    velocity,
                },
                body_b: BodyState {
                    handle: BodyHandle(999),
                    velocity: Vec2::ZERO,
                },
            }
        }

        fn feed(&mut self, pair: CollisionPair, now: f64) -> Vec<BoardEvent> {
            self.interpreter
                .interpret(&[pair], now, &self.registry, &mut self.audio)
        }
    }

    #[test]
    fn test_peg_hit_plays_scaled_intensity() {
        let mut rig = Rig::new();
        let events = rig.feed(rig.pair(BodyLabel::Peg, Vec2::new(3.0, 4.0)), 0.0);
        assert_eq!(
            events,
            vec![BoardEvent::Impact {
                ball: rig.ball,
                intensity: 0.5
            }]
        );
        assert_eq!(rig.audio.played, vec![0.5]);
    }

    #[test]
    fn test_intensity_is_capped() {
        let mut rig = Rig::new();
        rig.feed(rig.pair(BodyLabel::Wall, Vec2::new(0.0, 40.0)), 0.0);
        assert_eq!(rig.audio.played, vec![1.0]);
    }

    #[test]
    fn test_impacts_debounced_per_ball() {
        let mut rig = Rig::new();
        let hit = rig.pair(BodyLabel::Peg, Vec2::new(0.0, 5.0));
        // A burst of contacts every 10 ms for 200 ms
        let mut fired_at = Vec::new();
        for i in 0..=20 {
            let now = i as f64 * 10.0;
            if !rig.feed(hit, now).is_empty() {
                fired_at.push(now);
            }
        }
        assert_eq!(fired_at, vec![0.0, 60.0, 120.0, 180.0]);
        for gap in fired_at.windows(2) {
            assert!(gap[1] - gap[0] > IMPACT_DEBOUNCE_MS);
        }
        assert_eq!(rig.audio.played.len(), 4);
    }

    #[test]
    fn test_sensor_contact_plays_no_sound() {
        let mut rig = Rig::new();
        rig.feed(rig.pair(BodyLabel::SlotSensor(1), Vec2::new(0.0, 9.0)), 0.0);
        assert!(rig.audio.played.is_empty());
    }

    #[test]
    fn test_win_emitted_once_per_ball() {
        let mut rig = Rig::new();
        let pair = rig.pair(BodyLabel::SlotSensor(3), Vec2::new(0.0, 2.0));
        let first = rig.feed(pair, 100.0);
        assert_eq!(
            first,
            vec![BoardEvent::Win(WinRecord {
                ball: rig.ball,
                slot_index: 3,
                timestamp: 100.0
            })]
        );
        for step in 1..10 {
            assert!(rig.feed(pair, 100.0 + step as f64 * 16.0).is_empty());
        }
        // Even a different sensor cannot re-declare
        assert!(rig.feed(rig.pair(BodyLabel::SlotSensor(4), Vec2::ZERO), 500.0).is_empty());
        assert_eq!(rig.interpreter.win_for(rig.ball).unwrap().slot_index, 3);
    }

    #[test]
    fn test_sensor_on_either_side() {
        let mut rig = Rig::new();
        let pair = rig.pair(BodyLabel::SlotSensor(0), Vec2::ZERO).flipped();
        let events = rig.feed(pair, 0.0);
        assert!(matches!(events[..], [BoardEvent::Win(WinRecord { slot_index: 0, .. })]));
    }

    #[test]
    fn test_forget_allows_new_win() {
        let mut rig = Rig::new();
        let pair = rig.pair(BodyLabel::SlotSensor(2), Vec2::ZERO);
        rig.feed(pair, 0.0);
        rig.feed(rig.pair(BodyLabel::Peg, Vec2::ONE), 0.0);
        rig.interpreter.forget(rig.ball);
        assert!(rig.interpreter.debounce().is_empty());
        assert_eq!(rig.feed(pair, 10.0).len(), 1);
    }

    #[test]
    fn test_unknown_ball_is_ignored() {
        let mut rig = Rig::new();
        let mut pair = rig.pair(BodyLabel::Peg, Vec2::new(0.0, 5.0));
        pair.kind_a = BodyLabel::Ball(BallId(4242));
        let result = rig
            .interpreter
            .interpret_pair(&pair, 0.0, &rig.registry, &mut rig.audio);
        assert_eq!(result, Err(BoardError::UnknownBodyReference(rig.handle)));
        assert!(rig.feed(pair, 0.0).is_empty());
        assert!(rig.audio.played.is_empty());
    }

    #[test]
    fn test_internal_and_ball_pairs_ignored() {
        let mut rig = Rig::new();
        assert!(rig.feed(rig.pair(BodyLabel::Internal, Vec2::ONE), 0.0).is_empty());
        assert!(rig.feed(rig.pair(BodyLabel::Ball(rig.ball), Vec2::ONE), 0.0).is_empty());
        assert!(rig.audio.played.is_empty());
    }

    #[test]
    fn test_audio_failure_is_swallowed() {
        let mut rig = Rig::new();
        rig.audio.fail = true;
        let events = rig.feed(rig.pair(BodyLabel::Divider, Vec2::new(0.0, 10.0)), 0.0);
        assert_eq!(events.len(), 1);
        // Still debounced after a failed play
        assert!(rig.feed(rig.pair(BodyLabel::Divider, Vec2::new(0.0, 10.0)), 20.0).is_empty());
    }

    #[test]
    fn test_reset_clears_wins_and_debounce() {
        let mut rig = Rig::new();
        rig.feed(rig.pair(BodyLabel::SlotSensor(1), Vec2::ZERO), 0.0);
        rig.feed(rig.pair(BodyLabel::Peg, Vec2::ONE), 0.0);
        rig.interpreter.reset();
        assert!(rig.interpreter.win_for(rig.ball).is_none());
        assert!(rig.interpreter.debounce().is_empty());
    }
}
