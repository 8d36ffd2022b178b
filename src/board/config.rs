//! Board parameters and the layout derived from them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::BoardError;
use crate::consts::*;

/// Immutable board parameters. Any change regenerates the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    /// Number of slots (2..=6)
    pub slot_count: u32,
    pub peg_rows: u32,
    pub gravity: f32,
    /// Bounciness of balls and pegs
    pub restitution: f32,
    pub friction: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 700.0,
            slot_count: 6,
            peg_rows: 8,
            gravity: 1.0,
            restitution: 0.6,
            friction: 0.1,
        }
    }
}

impl BoardConfig {
    pub fn new(width: f32, height: f32, slot_count: u32) -> Self {
        Self {
            width,
            height,
            slot_count,
            ..Self::default()
        }
    }

    pub fn with_peg_rows(mut self, peg_rows: u32) -> Self {
        self.peg_rows = peg_rows;
        self
    }

    pub fn with_physics(mut self, gravity: f32, restitution: f32, friction: f32) -> Self {
        self.gravity = gravity;
        self.restitution = restitution;
        self.friction = friction;
        self
    }

    /// Derived sizes and positions (not validated)
    pub fn layout(&self) -> BoardLayout {
        BoardLayout::new(self)
    }

    /// Reject parameters that cannot produce a board.
    ///
    /// Top-level values are never clamped; only derived positions are.
    pub fn validate(&self) -> Result<(), BoardError> {
        let invalid = |msg: String| Err(BoardError::InvalidConfig(msg));

        if !(self.width.is_finite() && self.width > 0.0) {
            return invalid(format!("width must be positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return invalid(format!("height must be positive, got {}", self.height));
        }
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&self.slot_count) {
            return invalid(format!(
                "slot count must be in {MIN_SLOTS}..={MAX_SLOTS}, got {}",
                self.slot_count
            ));
        }
        if self.peg_rows == 0 {
            return invalid("at least one peg row is required".to_string());
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("restitution", self.restitution),
            ("friction", self.friction),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
        }

        let layout = self.layout();
        if layout.row_spacing <= layout.peg_radius * 2.0 {
            return invalid(format!(
                "{} peg rows do not fit in height {}",
                self.peg_rows, self.height
            ));
        }
        let (top, bottom) = layout.drop_band();
        if top >= bottom {
            return invalid(format!("height {} leaves no drop zone", self.height));
        }
        if layout.min_x() >= layout.max_x() {
            return invalid(format!("width {} leaves no room to position a ball", self.width));
        }
        Ok(())
    }
}

/// Sizes and positions derived from a [`BoardConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub width: f32,
    pub height: f32,
    pub slot_count: u32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    pub slot_width: f32,
    pub slot_height: f32,
    pub divider_width: f32,
    /// Bottom edge of the drop zone, which is also the top of the peg field
    pub drop_zone_height: f32,
    /// Inset of the outermost pegs from the side walls
    pub side_margin: f32,
    /// Horizontal gap between pegs in a full row
    pub peg_spacing: f32,
    /// Vertical gap between peg rows
    pub row_spacing: f32,
}

impl BoardLayout {
    fn new(config: &BoardConfig) -> Self {
        let width = config.width;
        let height = config.height;
        let slots = config.slot_count.max(1) as f32;
        let peg_radius = width * PEG_RADIUS_FRACTION;
        let side_margin = peg_radius * 2.0;
        let slot_height = height * SLOT_HEIGHT_FRACTION;
        let drop_zone_height = height * BOARD_TOP_FRACTION;
        let available_height =
            height - drop_zone_height - slot_height - height * BOTTOM_SAFETY_FRACTION;

        Self {
            width,
            height,
            slot_count: config.slot_count,
            ball_radius: width * BALL_RADIUS_FRACTION,
            peg_radius,
            slot_width: width / slots,
            slot_height,
            divider_width: width * DIVIDER_WIDTH_FRACTION,
            drop_zone_height,
            side_margin,
            // Full rows hold slot_count + 1 pegs
            peg_spacing: (width - side_margin * 2.0) / slots,
            row_spacing: available_height / (config.peg_rows as f32 + 1.0),
        }
    }

    /// Leftmost x a pinned ball may sit at
    pub fn min_x(&self) -> f32 {
        self.ball_radius + DROP_ZONE_SIDE_PAD
    }

    /// Rightmost x a pinned ball may sit at
    pub fn max_x(&self) -> f32 {
        self.width - self.ball_radius - DROP_ZONE_SIDE_PAD
    }

    /// Vertical band (top, bottom) a nudged ball is kept in
    pub fn drop_band(&self) -> (f32, f32) {
        (DROP_ZONE_TOP, self.drop_zone_height - DROP_ZONE_BOTTOM_PAD)
    }

    /// Lowest point a dragged ball may be pulled to (just above the slots)
    pub fn drag_floor(&self) -> f32 {
        self.height - self.slot_height - self.ball_radius
    }

    /// Whether a ball at height `y` may be dropped
    pub fn in_drop_zone(&self, y: f32) -> bool {
        y < self.drop_zone_height
    }

    /// Where new balls appear: top centre
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height * SPAWN_HEIGHT_FRACTION)
    }

    /// Clamp a keyboard-positioned ball into the drop zone
    pub fn clamp_to_drop_band(&self, p: Vec2) -> Vec2 {
        let (top, bottom) = self.drop_band();
        crate::clamp_point(
            p,
            Vec2::new(self.min_x(), top),
            Vec2::new(self.max_x().max(self.min_x()), bottom.max(top)),
        )
    }

    /// Clamp a dragged ball into the playfield above the slots
    pub fn clamp_to_drag_area(&self, p: Vec2) -> Vec2 {
        let (top, _) = self.drop_band();
        crate::clamp_point(
            p,
            Vec2::new(self.min_x(), top),
            Vec2::new(self.max_x().max(self.min_x()), self.drag_floor().max(top)),
        )
    }

    /// Horizontal centre of a slot
    pub fn slot_center_x(&self, slot: usize) -> f32 {
        self.slot_width * (slot as f32 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BoardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        for (w, h) in [(0.0, 700.0), (600.0, -1.0), (f32::NAN, 700.0)] {
            let result = BoardConfig::new(w, h, 6).validate();
            assert!(matches!(result, Err(BoardError::InvalidConfig(_))), "{w}x{h}");
        }
    }

    #[test]
    fn test_slot_count_range() {
        assert!(BoardConfig::new(600.0, 700.0, 1).validate().is_err());
        assert!(BoardConfig::new(600.0, 700.0, 7).validate().is_err());
        for slots in 2..=6 {
            assert!(BoardConfig::new(600.0, 700.0, slots).validate().is_ok());
        }
    }

    #[test]
    fn test_negative_physics_rejected() {
        let config = BoardConfig::default().with_physics(1.0, -0.1, 0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_many_rows_rejected() {
        let config = BoardConfig::default().with_peg_rows(60);
        assert!(matches!(config.validate(), Err(BoardError::InvalidConfig(_))));
    }

    #[test]
    fn test_tiny_board_rejected() {
        assert!(BoardConfig::new(600.0, 100.0, 6).validate().is_err());
    }

    #[test]
    fn test_layout_proportions() {
        let layout = BoardConfig::default().layout();
        assert!((layout.ball_radius - 15.0).abs() < 1e-4);
        assert!((layout.slot_width - 100.0).abs() < 1e-4);
        assert!((layout.drop_zone_height - 105.0).abs() < 1e-4);
        assert!((layout.min_x() - 25.0).abs() < 1e-4);
        assert!((layout.max_x() - 575.0).abs() < 1e-4);
        assert_eq!(layout.drop_band(), (20.0, layout.drop_zone_height - 10.0));
        assert!(layout.in_drop_zone(104.0));
        assert!(!layout.in_drop_zone(106.0));
    }
}
