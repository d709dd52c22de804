//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Stable iteration order (entity store order)
//! - No rendering, audio or platform dependencies; side effects leave as events

pub mod collision;
pub mod events;
pub mod input;
pub mod state;
pub mod tick;
pub mod turn;

pub use collision::{Contact, resolve_pair};
pub use events::SimEvent;
pub use input::{DragState, Shot};
pub use state::{Board, Dimensions, Disc, MatchPhase, MatchState, Player, TurnBook};
pub use tick::{TickReport, tick};
pub use turn::{ShotOutcome, ShotReport, check_match_over, classify, evaluate_shot};
