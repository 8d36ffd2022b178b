//! Board simulation controller
//!
//! Deterministic board core, layered leaves first:
//! - `config`: board parameters and derived layout
//! - `geometry`: static bodies (walls, pegs, dividers, slot sensors)
//! - `registry`: the balls currently in play
//! - `interaction`: pin / drag / release state machine
//! - `events`: collision stream to impact sounds and wins
//! - `controller`: wires everything to a physics engine

pub mod config;
pub mod controller;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod registry;

use thiserror::Error;

use crate::physics::BodyHandle;

pub use config::{BoardConfig, BoardLayout};
pub use controller::{BallView, BoardController, BoardSnapshot};
pub use events::{BoardEvent, CollisionDebounceTable, EventInterpreter, WinRecord};
pub use geometry::{StaticBody, StaticBodyKind, generate};
pub use interaction::{Direction, DropSession, InteractionMachine, InteractionPhase, ReleaseOutcome};
pub use registry::{Ball, BallColors, BallId, BodyRegistry};

/// Board errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// Board parameters that cannot produce a valid board
    #[error("invalid board config: {0}")]
    InvalidConfig(String),
    /// A collision named a body the board does not track
    #[error("collision references unknown body {0:?}")]
    UnknownBodyReference(BodyHandle),
}
