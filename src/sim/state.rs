//! Match state and core simulation types
//!
//! `MatchState` owns every disc. Physics and turn arbitration borrow it for a
//! single call and never hold references across ticks.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::{DragState, Shot};
use super::turn::ShotOutcome;
use crate::ellipse_norm_sq;
use crate::error::GeometryError;
use crate::tuning::LayoutTuning;

/// Disc owner and turn identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::A, Player::B];

    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => f.write_str("player A"),
            Player::B => f.write_str("player B"),
        }
    }
}

/// Surface size supplied by the host at setup/resize time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GeometryError::NonPositive {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Elliptical playing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub center: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Board {
    /// Board inscribed in the surface, scaled by the layout fill fractions
    pub fn from_dimensions(dims: Dimensions, layout: &LayoutTuning) -> Result<Self, GeometryError> {
        dims.validate()?;
        Ok(Self {
            center: Vec2::new(dims.width / 2.0, dims.height / 2.0),
            radius_x: dims.width / 2.0 * layout.board_fill_x,
            radius_y: dims.height / 2.0 * layout.board_fill_y,
        })
    }

    /// Radius for every disc placed on this board
    pub fn disc_radius(&self, layout: &LayoutTuning) -> f32 {
        self.radius_x.min(self.radius_y) * layout.disc_radius_fraction
    }

    /// Ejection semi-axes for a disc of `radius`
    pub fn eject_limits(&self, radius: f32, margin: f32) -> Vec2 {
        Vec2::new(self.radius_x + radius * margin, self.radius_y + radius * margin)
    }

    /// Squared normalized distance from center against the ejection ellipse
    pub fn eject_norm_sq(&self, pos: Vec2, radius: f32, margin: f32) -> f32 {
        ellipse_norm_sq(pos - self.center, self.eject_limits(radius, margin))
    }

    /// Exclusive test: a disc exactly on the ejection ellipse stays in play
    pub fn is_outside(&self, pos: Vec2, radius: f32, margin: f32) -> bool {
        self.eject_norm_sq(pos, radius, margin) > 1.0
    }
}

/// A player's disc (chapa)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    id: u32,
    radius: f32,
    pub owner: Player,
    pub pos: Vec2,
    pub vel: Vec2,
    pub in_play: bool,
}

impl Disc {
    /// Unchecked; `MatchState::with_discs` validates caller-built layouts
    pub fn new(id: u32, owner: Player, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            radius,
            owner,
            pos,
            vel: Vec2::ZERO,
            in_play: true,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Remove from play. Ejection is permanent for the match.
    pub fn eject(&mut self) {
        self.in_play = false;
        self.vel = Vec2::ZERO;
    }
}

/// Shot lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for a shot
    Idle,
    /// Discs in motion
    Resolving,
    /// All discs stopped, turn rules running (never observed between ticks)
    Evaluating,
    /// A player has no discs left
    GameOver { winner: Player },
}

/// Per-shot bookkeeping, cleared whenever a shot starts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnBook {
    pub shooter: Option<u32>,
    /// Distinct discs touched by the shooter this shot
    pub struck: BTreeSet<u32>,
    /// Opposing discs ejected this shot
    pub enemies_ejected: u32,
}

impl TurnBook {
    pub fn begin_shot(&mut self, shooter: u32) {
        self.shooter = Some(shooter);
        self.struck.clear();
        self.enemies_ejected = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub dimensions: Dimensions,
    pub board: Board,
    /// Entity store, in stable placement order
    pub discs: Vec<Disc>,
    pub turn: Player,
    pub phase: MatchPhase,
    pub book: TurnBook,
    /// Released shot waiting for the next physics step
    pub pending_shot: Option<Shot>,
    /// Gesture in progress
    pub drag: Option<DragState>,
    pub last_outcome: Option<ShotOutcome>,
    /// Physics ticks run this match
    pub time_ticks: u64,
    next_id: u32,
}

impl MatchState {
    /// Fresh match laid out for the given surface
    pub fn new(dims: Dimensions, layout: &LayoutTuning) -> Result<Self, GeometryError> {
        let board = Board::from_dimensions(dims, layout)?;
        let mut state = Self::empty(dims, board, 1);
        state.place_formation(layout);
        Ok(state)
    }

    /// Match with a caller-supplied disc layout.
    ///
    /// Every disc needs a positive finite radius and an id of its own.
    pub fn with_discs(
        dims: Dimensions,
        board: Board,
        discs: Vec<Disc>,
    ) -> Result<Self, GeometryError> {
        dims.validate()?;
        let mut seen = BTreeSet::new();
        for disc in &discs {
            if !disc.radius.is_finite() || disc.radius <= 0.0 {
                return Err(GeometryError::DiscRadius {
                    id: disc.id,
                    radius: disc.radius,
                });
            }
            if !seen.insert(disc.id) {
                return Err(GeometryError::DuplicateDiscId(disc.id));
            }
        }

        let next_id = discs.iter().map(|d| d.id + 1).max().unwrap_or(1);
        let mut state = Self::empty(dims, board, next_id);
        state.discs = discs;
        Ok(state)
    }

    fn empty(dimensions: Dimensions, board: Board, next_id: u32) -> Self {
        Self {
            dimensions,
            board,
            discs: Vec::new(),
            turn: Player::A,
            phase: MatchPhase::Idle,
            book: TurnBook::default(),
            pending_shot: None,
            drag: None,
            last_outcome: None,
            time_ticks: 0,
            next_id,
        }
    }

    /// Allocate a new entity ID. Ids keep counting across resets.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rebuild the store and bookkeeping for a new match on the current board
    pub fn reset(&mut self, layout: &LayoutTuning) {
        *self = Self::empty(self.dimensions, self.board, self.next_id);
        self.place_formation(layout);
    }

    /// Recompute the board for new surface dimensions and start a new match.
    /// Invalid dimensions leave the current match untouched.
    pub fn resize(&mut self, dims: Dimensions, layout: &LayoutTuning) -> Result<(), GeometryError> {
        let board = Board::from_dimensions(dims, layout)?;
        let next_id = self.next_id;
        *self = Self::empty(dims, board, next_id);
        self.place_formation(layout);
        Ok(())
    }

    /// Two mirrored vertical columns, player A left of center, B right
    fn place_formation(&mut self, layout: &LayoutTuning) {
        let radius = self.board.disc_radius(layout);
        let spacing = radius * layout.disc_spacing;
        let count = layout.discs_per_player;
        let top = self.board.center.y - spacing * (count.saturating_sub(1)) as f32 / 2.0;
        let dx = self.board.radius_x * layout.column_offset;

        for i in 0..count {
            let y = top + spacing * i as f32;
            for (owner, x) in [
                (Player::A, self.board.center.x - dx),
                (Player::B, self.board.center.x + dx),
            ] {
                let id = self.next_entity_id();
                self.discs.push(Disc::new(id, owner, Vec2::new(x, y), radius));
            }
        }
        log::debug!(
            "Placed {} discs (radius {:.1}) on board {:.0}x{:.0}",
            self.discs.len(),
            radius,
            self.board.radius_x * 2.0,
            self.board.radius_y * 2.0
        );
    }

    pub fn disc(&self, id: u32) -> Option<&Disc> {
        self.discs.iter().find(|d| d.id == id)
    }

    pub fn disc_mut(&mut self, id: u32) -> Option<&mut Disc> {
        self.discs.iter_mut().find(|d| d.id == id)
    }

    /// Discs still on the board for `player`
    pub fn active_count(&self, player: Player) -> usize {
        self.discs
            .iter()
            .filter(|d| d.in_play && d.owner == player)
            .count()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            MatchPhase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::GameOver { .. })
    }

    /// Owner of the disc currently being shot
    pub fn shooter_owner(&self) -> Option<Player> {
        self.book
            .shooter
            .and_then(|id| self.disc(id))
            .map(|d| d.owner)
    }
}
