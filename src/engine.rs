//! Engine facade
//!
//! Wraps a `MatchState` with its tuning and an event queue. The scheduler
//! thread and the input thread share one engine behind a single lock, so a
//! shot can never land in the middle of a physics step.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ChapasError, GeometryError, RejectedShot};
use crate::sim::input;
use crate::sim::{Board, Dimensions, MatchPhase, MatchState, Player, ShotOutcome, SimEvent, tick};
use crate::tuning::Tuning;

/// Events kept for a collaborator that is not draining them
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Engine shared between the scheduler and input handling
pub type SharedEngine = Arc<Mutex<Engine>>;

pub struct Engine {
    state: MatchState,
    tuning: Tuning,
    events: Vec<SimEvent>,
}

impl Engine {
    /// Validate tuning and lay out a fresh match for the surface
    pub fn new(dims: Dimensions, tuning: Tuning) -> Result<Self, ChapasError> {
        tuning.validate()?;
        let state = MatchState::new(dims, &tuning.layout)?;
        log::info!(
            "New match on {:.0}x{:.0} surface, {} discs per player",
            dims.width,
            dims.height,
            tuning.layout.discs_per_player
        );
        Ok(Self::from_state(state, tuning))
    }

    /// Engine around an existing match state
    pub fn from_state(state: MatchState, tuning: Tuning) -> Self {
        Self {
            state,
            tuning,
            events: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    /// Select a disc near `hint` and shoot it along `drag`
    pub fn start_shot(&mut self, hint: Vec2, drag: Vec2) -> Result<(), RejectedShot> {
        input::start_shot(&mut self.state, hint, drag, &self.tuning)
            .map(|_| ())
            .inspect_err(|reason| log::debug!("Shot rejected: {reason}"))
    }

    /// Gesture start. Returns the selected disc.
    pub fn press(&mut self, point: Vec2) -> Result<u32, RejectedShot> {
        input::press(&mut self.state, point, &self.tuning.shot)
            .inspect_err(|reason| log::debug!("Press ignored: {reason}"))
    }

    pub fn drag_to(&mut self, point: Vec2) -> Result<(), RejectedShot> {
        input::drag_to(&mut self.state, point)
    }

    /// Gesture end: fire the selected disc slingshot-style
    pub fn release(&mut self, point: Vec2) -> Result<(), RejectedShot> {
        input::release(&mut self.state, point, &self.tuning)
            .map(|_| ())
            .inspect_err(|reason| log::debug!("Release ignored: {reason}"))
    }

    pub fn cancel_drag(&mut self) {
        input::cancel_drag(&mut self.state);
    }

    /// Advance physics by one step and queue its events
    pub fn tick(&mut self, dt: f32) {
        let report = tick(&mut self.state, &self.tuning.physics, dt);
        if report.events.is_empty() {
            return;
        }
        self.events.extend(report.events);
        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a new match on the current board
    pub fn reset(&mut self) {
        self.state.reset(&self.tuning.layout);
        self.events.clear();
        log::info!("Match reset");
    }

    /// New surface size: recompute the board and start a new match
    pub fn resize(&mut self, dims: Dimensions) -> Result<(), GeometryError> {
        self.state.resize(dims, &self.tuning.layout)?;
        self.events.clear();
        log::info!("Board resized to {:.0}x{:.0}", dims.width, dims.height);
        Ok(())
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let aim = state.drag.and_then(|drag| {
            state.disc(drag.disc_id).map(|disc| AimView {
                disc_id: drag.disc_id,
                from: disc.pos,
                to: drag.current,
            })
        });

        Snapshot {
            discs: state
                .discs
                .iter()
                .map(|d| DiscView {
                    id: d.id(),
                    owner: d.owner,
                    pos: d.pos,
                    vel: d.vel,
                    radius: d.radius(),
                    in_play: d.in_play,
                })
                .collect(),
            turn: state.turn,
            phase: state.phase.into(),
            winner: state.winner(),
            remaining_a: state.active_count(Player::A),
            remaining_b: state.active_count(Player::B),
            board: state.board,
            aim,
            last_outcome: state.last_outcome,
            tick: state.time_ticks,
        }
    }
}

/// Phase as seen between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseView {
    Idle,
    Resolving,
    GameOver,
}

impl From<MatchPhase> for PhaseView {
    fn from(phase: MatchPhase) -> Self {
        match phase {
            MatchPhase::Idle => PhaseView::Idle,
            // Evaluating only exists inside a tick
            MatchPhase::Resolving | MatchPhase::Evaluating => PhaseView::Resolving,
            MatchPhase::GameOver { .. } => PhaseView::GameOver,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscView {
    pub id: u32,
    pub owner: Player,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub in_play: bool,
}

/// Pull line from the selected disc to the current drag point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimView {
    pub disc_id: u32,
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub discs: Vec<DiscView>,
    pub turn: Player,
    pub phase: PhaseView,
    pub winner: Option<Player>,
    pub remaining_a: usize,
    pub remaining_b: usize,
    pub board: Board,
    pub aim: Option<AimView>,
    pub last_outcome: Option<ShotOutcome>,
    pub tick: u64,
}

impl Snapshot {
    pub fn remaining(&self, player: Player) -> usize {
        match player {
            Player::A => self.remaining_a,
            Player::B => self.remaining_b,
        }
    }

    pub fn active_discs(&self) -> impl Iterator<Item = &DiscView> {
        self.discs.iter().filter(|d| d.in_play)
    }
}
