//! Plinko Decider - let a falling ball make the call
//!
//! Core modules:
//! - `board`: Board simulation controller (geometry, balls, input, events)
//! - `physics`: Physics engine boundary plus a small built-in engine
//! - `audio`: Impact feedback (Web Audio on wasm, silent natively)
//! - `settings`: User-tunable physics and appearance
//! - `labels`: Decision labels shown under the slots

pub mod audio;
pub mod board;
pub mod labels;
pub mod physics;
pub mod settings;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use board::{BoardConfig, BoardController, BoardError};
pub use labels::Labels;
pub use settings::{BackgroundPreset, Settings};

use glam::Vec2;

/// Board proportions and timing constants
pub mod consts {
    /// Fixed physics step (60 Hz), in milliseconds
    pub const STEP_MS: f32 = 1000.0 / 60.0;
    /// Substeps per physics step (keeps thin dividers solid)
    pub const SUBSTEPS: u32 = 4;
    /// Gravity scale applied to the configured gravity (px/ms² per unit)
    pub const GRAVITY_SCALE: f32 = 0.001;
    /// Per-step velocity damping for free balls
    pub const AIR_FRICTION: f32 = 0.001;

    /// Ball radius as a fraction of board width
    pub const BALL_RADIUS_FRACTION: f32 = 0.025;
    /// Peg radius as a fraction of board width
    pub const PEG_RADIUS_FRACTION: f32 = 0.012;
    /// Slot band height as a fraction of board height
    pub const SLOT_HEIGHT_FRACTION: f32 = 0.12;
    /// Top of the peg field (and bottom of the drop zone) as a fraction of height
    pub const BOARD_TOP_FRACTION: f32 = 0.15;
    /// Empty band between the last peg row and the slots, fraction of height
    pub const BOTTOM_SAFETY_FRACTION: f32 = 0.05;
    /// Divider thickness as a fraction of board width
    pub const DIVIDER_WIDTH_FRACTION: f32 = 0.008;
    /// Spawn height of a new ball as a fraction of board height
    pub const SPAWN_HEIGHT_FRACTION: f32 = 0.08;

    /// Wall thickness (px)
    pub const WALL_THICKNESS: f32 = 20.0;
    /// Sensor height shrink relative to the slot band (px)
    pub const SENSOR_HEIGHT_INSET: f32 = 10.0;

    /// Slot count limits
    pub const MIN_SLOTS: u32 = 2;
    pub const MAX_SLOTS: u32 = 6;

    /// Keep pinned balls this far from the side walls (px)
    pub const DROP_ZONE_SIDE_PAD: f32 = 10.0;
    /// Highest a pinned ball may be held (px from the top)
    pub const DROP_ZONE_TOP: f32 = 20.0;
    /// Gap kept between a nudged ball and the bottom of the drop zone (px)
    pub const DROP_ZONE_BOTTOM_PAD: f32 = 10.0;
    /// Extra grab radius around a ball for pointer hit tests (px)
    pub const GRAB_SLOP: f32 = 10.0;
    /// Fraction of the pointer offset applied per tick while dragging
    pub const DRAG_PULL: f32 = 0.15;
    /// Keyboard nudge distance (px)
    pub const NUDGE_STEP: f32 = 20.0;
    /// Horizontal jitter range for "Add Ball" spawns (px)
    pub const ADD_BALL_JITTER: f32 = 100.0;

    /// Minimum spacing between impact sounds for one ball (ms)
    pub const IMPACT_DEBOUNCE_MS: f64 = 50.0;
    /// Ball speed (px/step) that maps to full impact intensity
    pub const IMPACT_FULL_SPEED: f32 = 10.0;

    /// Largest board the page lays out (px)
    pub const MAX_BOARD_WIDTH: f32 = 600.0;
    pub const MAX_BOARD_HEIGHT: f32 = 720.0;
}

/// Board size for a container of the given width (keeps a 5:6 aspect)
pub fn board_dimensions(container_width: f32) -> (f32, f32) {
    let width = container_width.min(consts::MAX_BOARD_WIDTH);
    let height = (width * 1.2).min(consts::MAX_BOARD_HEIGHT);
    (width, height)
}

/// Clamp a point into an axis-aligned box
#[inline]
pub fn clamp_point(p: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(p.x.clamp(min.x, max.x), p.y.clamp(min.y, max.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_dimensions() {
        assert_eq!(board_dimensions(1200.0), (600.0, 720.0));
        let (w, h) = board_dimensions(400.0);
        assert_eq!(w, 400.0);
        assert!((h - 480.0).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_point() {
        let p = clamp_point(Vec2::new(-5.0, 50.0), Vec2::ZERO, Vec2::splat(10.0));
        assert_eq!(p, Vec2::new(0.0, 10.0));
    }
}
