//! Board geometry generation
//!
//! Pure and deterministic: the same [`BoardConfig`] always yields the same
//! bodies in the same order (walls, pegs, dividers, slot sensors).
//!
//! Coordinates are screen-style: x grows right, y grows down, the visible
//! board spans `[0, width] × [0, height]`. Walls sit just outside that box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{BoardConfig, BoardError, BoardLayout};
use crate::consts::*;
use crate::physics::{BodyLabel, BodySpec, Shape};

/// What a static body is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticBodyKind {
    Wall,
    Peg,
    Divider,
    SlotSensor { slot_index: usize },
}

/// An immovable board body. Replaced wholesale when the config changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticBody {
    pub kind: StaticBodyKind,
    pub shape: Shape,
    pub position: Vec2,
}

impl StaticBody {
    fn wall(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            kind: StaticBodyKind::Wall,
            shape: Shape::rect(width, height),
            position,
        }
    }

    pub fn label(&self) -> BodyLabel {
        match self.kind {
            StaticBodyKind::Wall => BodyLabel::Wall,
            StaticBodyKind::Peg => BodyLabel::Peg,
            StaticBodyKind::Divider => BodyLabel::Divider,
            StaticBodyKind::SlotSensor { slot_index } => BodyLabel::SlotSensor(slot_index),
        }
    }

    /// Engine body for this piece of geometry. Pegs share the ball bounciness.
    pub fn to_spec(&self, config: &BoardConfig) -> BodySpec {
        match self.kind {
            StaticBodyKind::SlotSensor { .. } => {
                BodySpec::sensor(self.label(), self.shape, self.position)
            }
            StaticBodyKind::Peg => BodySpec::fixed(self.label(), self.shape, self.position)
                .with_restitution(config.restitution),
            StaticBodyKind::Wall | StaticBodyKind::Divider => {
                BodySpec::fixed(self.label(), self.shape, self.position)
            }
        }
    }
}

/// Build every static body for a board
pub fn generate(config: &BoardConfig) -> Result<Vec<StaticBody>, BoardError> {
    config.validate()?;
    let layout = config.layout();

    let mut bodies = Vec::new();
    push_walls(&layout, &mut bodies);
    push_pegs(&layout, config.peg_rows, &mut bodies);
    push_slots(&layout, &mut bodies);
    Ok(bodies)
}

/// Side walls run the full height plus the thickness of the ceiling and floor
/// so the corners are sealed without any two walls overlapping.
fn push_walls(layout: &BoardLayout, bodies: &mut Vec<StaticBody>) {
    let (w, h) = (layout.width, layout.height);
    let t = WALL_THICKNESS;
    let side_height = h + t * 2.0;

    // Floor
    bodies.push(StaticBody::wall(Vec2::new(w / 2.0, h + t / 2.0), w, t));
    // Left and right
    bodies.push(StaticBody::wall(Vec2::new(-t / 2.0, h / 2.0), t, side_height));
    bodies.push(StaticBody::wall(Vec2::new(w + t / 2.0, h / 2.0), t, side_height));
    // Ceiling keeps a ball being positioned on the board
    bodies.push(StaticBody::wall(Vec2::new(w / 2.0, -t / 2.0), w, t));
}

/// Alternating full (slot_count + 1) and offset (slot_count) rows
fn push_pegs(layout: &BoardLayout, rows: u32, bodies: &mut Vec<StaticBody>) {
    let full_count = layout.slot_count as usize + 1;
    let shape = Shape::Circle {
        radius: layout.peg_radius,
    };

    for row in 0..rows {
        let y = layout.drop_zone_height + layout.row_spacing * (row as f32 + 1.0);
        let (count, start_x) = if row % 2 == 0 {
            (full_count, layout.side_margin)
        } else {
            (full_count - 1, layout.side_margin + layout.peg_spacing / 2.0)
        };

        for col in 0..count {
            bodies.push(StaticBody {
                kind: StaticBodyKind::Peg,
                shape,
                position: Vec2::new(start_x + layout.peg_spacing * col as f32, y),
            });
        }
    }
}

/// Dividers on every slot edge plus one sensor per slot.
///
/// The outer dividers are inset so they sit against the walls, and each
/// sensor is one divider width narrower per side so a ball resting on a
/// divider cannot touch two sensors.
fn push_slots(layout: &BoardLayout, bodies: &mut Vec<StaticBody>) {
    let slots = layout.slot_count as usize;
    let d = layout.divider_width;
    let band_y = layout.height - layout.slot_height / 2.0;

    for i in 0..=slots {
        let x = if i == 0 {
            d / 2.0
        } else if i == slots {
            layout.width - d / 2.0
        } else {
            layout.slot_width * i as f32
        };
        bodies.push(StaticBody {
            kind: StaticBodyKind::Divider,
            shape: Shape::rect(d, layout.slot_height),
            position: Vec2::new(x, band_y),
        });
    }

    for slot_index in 0..slots {
        bodies.push(StaticBody {
            kind: StaticBodyKind::SlotSensor { slot_index },
            shape: Shape::rect(
                layout.slot_width - d * 2.0,
                layout.slot_height - SENSOR_HEIGHT_INSET,
            ),
            position: Vec2::new(layout.slot_center_x(slot_index), band_y),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shapes_overlap;
    use proptest::prelude::*;

    fn sensors(bodies: &[StaticBody]) -> Vec<(usize, &StaticBody)> {
        bodies
            .iter()
            .filter_map(|b| match b.kind {
                StaticBodyKind::SlotSensor { slot_index } => Some((slot_index, b)),
                _ => None,
            })
            .collect()
    }

    fn count(bodies: &[StaticBody], kind: StaticBodyKind) -> usize {
        bodies.iter().filter(|b| b.kind == kind).count()
    }

    fn assert_no_overlap(bodies: &[StaticBody]) {
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                assert!(
                    !shapes_overlap(&a.shape, a.position, &b.shape, b.position, 1e-3),
                    "{a:?} overlaps {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_six_slot_board_sensor_centres() {
        let bodies = generate(&BoardConfig::new(600.0, 700.0, 6).with_peg_rows(8)).unwrap();
        let sensors = sensors(&bodies);
        assert_eq!(sensors.len(), 6);
        for (i, (slot, body)) in sensors.iter().enumerate() {
            assert_eq!(*slot, i);
            let expected = 50.0 + 100.0 * i as f32;
            assert!((body.position.x - expected).abs() < 1e-3, "slot {i} at {}", body.position.x);
        }
    }

    #[test]
    fn test_body_counts() {
        let bodies = generate(&BoardConfig::new(600.0, 700.0, 6).with_peg_rows(8)).unwrap();
        assert_eq!(count(&bodies, StaticBodyKind::Wall), 4);
        // Four full rows of 7 and four offset rows of 6
        assert_eq!(count(&bodies, StaticBodyKind::Peg), 4 * 7 + 4 * 6);
        assert_eq!(count(&bodies, StaticBodyKind::Divider), 7);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = BoardConfig::new(480.0, 576.0, 4).with_peg_rows(7);
        assert_eq!(generate(&config).unwrap(), generate(&config).unwrap());
    }

    #[test]
    fn test_default_board_has_no_overlap() {
        assert_no_overlap(&generate(&BoardConfig::default()).unwrap());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let result = generate(&BoardConfig::new(-600.0, 700.0, 6));
        assert!(matches!(result, Err(BoardError::InvalidConfig(_))));
        let result = generate(&BoardConfig::new(600.0, 700.0, 8));
        assert!(matches!(result, Err(BoardError::InvalidConfig(_))));
    }

    #[test]
    fn test_pegs_clear_of_walls() {
        let config = BoardConfig::default();
        let layout = config.layout();
        for peg in generate(&config)
            .unwrap()
            .iter()
            .filter(|b| b.kind == StaticBodyKind::Peg)
        {
            assert!(peg.position.x - layout.peg_radius >= layout.peg_radius - 1e-3);
            assert!(peg.position.x + layout.peg_radius <= config.width - layout.peg_radius + 1e-3);
        }
    }

    #[test]
    fn test_spec_labels_and_restitution() {
        let config = BoardConfig::default();
        let bodies = generate(&config).unwrap();
        let peg = bodies.iter().find(|b| b.kind == StaticBodyKind::Peg).unwrap();
        let spec = peg.to_spec(&config);
        assert_eq!(spec.label, BodyLabel::Peg);
        assert_eq!(spec.restitution, config.restitution);
        assert!(!spec.is_sensor);

        let (_, sensor) = sensors(&bodies)[2];
        let spec = sensor.to_spec(&config);
        assert_eq!(spec.label, BodyLabel::SlotSensor(2));
        assert!(spec.is_sensor);
    }

    fn valid_config() -> impl Strategy<Value = BoardConfig> {
        (200.0f32..1200.0, 1.0f32..1.6, 2u32..=6, 1u32..=12).prop_map(
            |(width, aspect, slots, rows)| {
                BoardConfig::new(width, width * aspect, slots).with_peg_rows(rows)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_no_static_bodies_overlap(config in valid_config()) {
            prop_assume!(config.validate().is_ok());
            let bodies = generate(&config).unwrap();
            for (i, a) in bodies.iter().enumerate() {
                for b in &bodies[i + 1..] {
                    prop_assert!(
                        !shapes_overlap(&a.shape, a.position, &b.shape, b.position, 1e-3),
                        "{:?} overlaps {:?}", a, b
                    );
                }
            }
        }

        #[test]
        fn prop_one_sensor_per_slot_inside_board(config in valid_config()) {
            prop_assume!(config.validate().is_ok());
            let bodies = generate(&config).unwrap();
            let sensors = sensors(&bodies);
            prop_assert_eq!(sensors.len(), config.slot_count as usize);
            for (i, (slot, body)) in sensors.iter().enumerate() {
                prop_assert_eq!(*slot, i);
                let (min, max) = body.shape.bounds(body.position);
                prop_assert!(min.x >= 0.0 && min.y >= 0.0);
                prop_assert!(max.x <= config.width + 1e-3 && max.y <= config.height + 1e-3);
            }
        }

        #[test]
        fn prop_slots_split_width_evenly(config in valid_config()) {
            prop_assume!(config.validate().is_ok());
            let layout = config.layout();
            let total = layout.slot_width * config.slot_count as f32;
            prop_assert!((total - config.width).abs() < config.width * 1e-5);

            let bodies = generate(&config).unwrap();
            let centres: Vec<f32> = sensors(&bodies).iter().map(|(_, b)| b.position.x).collect();
            for pair in centres.windows(2) {
                prop_assert!((pair[1] - pair[0] - layout.slot_width).abs() < 1e-2);
            }
            for (_, body) in sensors(&bodies) {
                if let Shape::Rect { half } = body.shape {
                    prop_assert!(half.x > 0.0);
                }
            }
        }
    }
}
