//! Ball registry
//!
//! Sole owner of the balls in play. The engine holds the same bodies by
//! handle; once a ball is unpinned the engine is authoritative for its motion
//! and [`BodyRegistry::sync`] mirrors it back here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::BoardConfig;
use crate::consts::AIR_FRICTION;
use crate::physics::{BodyHandle, BodyLabel, BodySpec, PhysicsEngine, Shape};

/// Ball identity, unique for the lifetime of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// Complementary fill/stroke hues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallColors {
    /// Fill hue in degrees
    pub hue: f32,
}

impl BallColors {
    pub fn fill_hue(&self) -> f32 {
        self.hue
    }

    pub fn stroke_hue(&self) -> f32 {
        (self.hue + 180.0) % 360.0
    }

    pub fn fill_css(&self) -> String {
        format!("hsl({:.0}, 100%, 60%)", self.fill_hue())
    }

    pub fn stroke_css(&self) -> String {
        format!("hsl({:.0}, 100%, 60%)", self.stroke_hue())
    }
}

/// A ball in play
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: BallId,
    pub handle: BodyHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Held in place for positioning (static in the engine)
    pub pinned: bool,
    pub colors: BallColors,
}

/// Every ball on the board, in spawn order
#[derive(Debug)]
pub struct BodyRegistry {
    balls: Vec<Ball>,
    next_id: u32,
    rng: Pcg32,
}

impl BodyRegistry {
    pub fn new(seed: u64) -> Self {
        Self {
            balls: Vec::new(),
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create a pinned ball at `position` and register it with the engine
    pub fn spawn<E: PhysicsEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        config: &BoardConfig,
        position: Vec2,
    ) -> BallId {
        let id = BallId(self.next_id);
        self.next_id += 1;

        let radius = config.layout().ball_radius;
        let colors = BallColors {
            hue: self.rng.random_range(0.0..360.0),
        };
        let handle = engine.add_body(BodySpec {
            label: BodyLabel::Ball(id),
            shape: Shape::Circle { radius },
            position,
            is_static: true,
            is_sensor: false,
            restitution: config.restitution,
            friction: config.friction,
            air_friction: AIR_FRICTION,
        });

        self.balls.push(Ball {
            id,
            handle,
            position,
            velocity: Vec2::ZERO,
            radius,
            pinned: true,
            colors,
        });
        log::debug!("Spawned ball {} at ({:.1}, {:.1})", id.0, position.x, position.y);
        id
    }

    /// Detach a ball from the engine and forget it. Unknown ids are ignored.
    pub fn remove<E: PhysicsEngine + ?Sized>(&mut self, engine: &mut E, id: BallId) -> bool {
        let Some(index) = self.balls.iter().position(|b| b.id == id) else {
            return false;
        };
        let ball = self.balls.remove(index);
        engine.remove_body(ball.handle);
        true
    }

    /// Remove every ball, returning the ids that were removed
    pub fn remove_all<E: PhysicsEngine + ?Sized>(&mut self, engine: &mut E) -> Vec<BallId> {
        self.balls
            .drain(..)
            .map(|ball| {
                engine.remove_body(ball.handle);
                ball.id
            })
            .collect()
    }

    /// Balls in spawn order; the last one is the most recent
    pub fn active_balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BallId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Uniform sample in `[-0.5, 0.5)` for spawn jitter
    pub fn jitter(&mut self) -> f32 {
        self.rng.random::<f32>() - 0.5
    }

    /// Copy engine position and velocity back into the mirrored ball state
    pub fn sync<E: PhysicsEngine + ?Sized>(&mut self, engine: &E) {
        for ball in self.balls.iter_mut().filter(|b| !b.pinned) {
            if let Some(position) = engine.position(ball.handle) {
                ball.position = position;
            }
            if let Some(velocity) = engine.velocity(ball.handle) {
                ball.velocity = velocity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::World;

    fn setup() -> (BodyRegistry, World, BoardConfig) {
        (BodyRegistry::new(7), World::new(1.0), BoardConfig::default())
    }

    #[test]
    fn test_spawn_registers_pinned_ball() {
        let (mut registry, mut world, config) = setup();
        let id = registry.spawn(&mut world, &config, Vec2::new(300.0, 56.0));

        let ball = registry.get(id).unwrap();
        assert!(ball.pinned);
        assert!((ball.radius - 15.0).abs() < 1e-4);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.label(ball.handle), Some(BodyLabel::Ball(id)));
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let (mut registry, mut world, config) = setup();
        let a = registry.spawn(&mut world, &config, Vec2::new(100.0, 50.0));
        let b = registry.spawn(&mut world, &config, Vec2::new(200.0, 50.0));
        assert_ne!(a, b);
        let order: Vec<BallId> = registry.active_balls().iter().map(|b| b.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut registry, mut world, config) = setup();
        let id = registry.spawn(&mut world, &config, Vec2::new(100.0, 50.0));
        assert!(registry.remove(&mut world, id));
        assert!(!registry.remove(&mut world, id));
        assert!(registry.is_empty());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_remove_all_clears_engine_bodies() {
        let (mut registry, mut world, config) = setup();
        for x in [100.0, 200.0, 300.0] {
            registry.spawn(&mut world, &config, Vec2::new(x, 50.0));
        }
        assert_eq!(registry.remove_all(&mut world).len(), 3);
        assert_eq!(registry.len(), 0);
        assert_eq!(world.body_count(), 0);
        assert!(registry.remove_all(&mut world).is_empty());
    }

    #[test]
    fn test_colors_are_complementary() {
        let (mut registry, mut world, config) = setup();
        let id = registry.spawn(&mut world, &config, Vec2::ZERO);
        let colors = registry.get(id).unwrap().colors;
        assert!((0.0..360.0).contains(&colors.fill_hue()));
        let diff = (colors.stroke_hue() - colors.fill_hue()).rem_euclid(360.0);
        assert!((diff - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_colors() {
        let config = BoardConfig::default();
        let mut world = World::new(1.0);
        let mut a = BodyRegistry::new(99);
        let mut b = BodyRegistry::new(99);
        let ia = a.spawn(&mut world, &config, Vec2::ZERO);
        let ib = b.spawn(&mut world, &config, Vec2::ZERO);
        assert_eq!(a.get(ia).unwrap().colors, b.get(ib).unwrap().colors);
    }

    #[test]
    fn test_sync_mirrors_free_balls_only() {
        let (mut registry, mut world, config) = setup();
        let pinned = registry.spawn(&mut world, &config, Vec2::new(100.0, 50.0));
        let free = registry.spawn(&mut world, &config, Vec2::new(300.0, 50.0));
        let handle = registry.get(free).unwrap().handle;
        registry.get_mut(free).unwrap().pinned = false;
        world.set_static(handle, false);
        world.run();
        world.step();
        registry.sync(&world);

        assert!(registry.get(free).unwrap().position.y > 50.0);
        assert_eq!(registry.get(pinned).unwrap().position, Vec2::new(100.0, 50.0));
    }
}
