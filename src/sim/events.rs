//! Discrete simulation events
//!
//! Emitted by the physics step and drained after each tick by renderers and
//! audio. The simulation never calls into those collaborators itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Player;
use super::turn::ShotOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A pending shot was applied to its disc
    ShotFired { disc: u32, velocity: Vec2 },
    /// Two discs touched
    Collision {
        a: u32,
        b: u32,
        point: Vec2,
        impulse: f32,
    },
    /// A disc left the board (explosion effect at `pos`)
    DiscEjected { id: u32, owner: Player, pos: Vec2 },
    /// All discs stopped and the turn rules ran
    ShotResolved {
        outcome: ShotOutcome,
        next_turn: Player,
    },
    MatchOver { winner: Player },
}
