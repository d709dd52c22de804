//! Drag-to-shoot input mapping
//!
//! A press picks one of the current player's discs, the drag is only tracked,
//! and the release fires slingshot-style: the shot travels from the release
//! point back toward the press point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{MatchPhase, MatchState};
use crate::ease_in_cubic;
use crate::error::RejectedShot;
use crate::tuning::{ShotTuning, Tuning};

/// A released shot, consumed by the next physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub shooter: u32,
    /// Press point minus release point
    pub drag: Vec2,
    /// Launch velocity (units/s)
    pub velocity: Vec2,
}

impl Shot {
    /// Map a drag vector to a launch velocity.
    ///
    /// Pull distance is clamped to `max_pull` and eased cubically, so short
    /// pulls give fine control and the last stretch carries most of the power.
    pub fn from_drag(shooter: u32, drag: Vec2, tuning: &ShotTuning) -> Self {
        let distance = drag.length().min(tuning.max_pull);
        let power = ease_in_cubic(distance / tuning.max_pull) * tuning.max_shot_speed;
        Self {
            shooter,
            drag,
            velocity: drag.normalize_or_zero() * power,
        }
    }
}

/// Gesture in progress: selected disc, press point, latest drag point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub disc_id: u32,
    pub press: Vec2,
    pub current: Vec2,
}

fn ensure_can_shoot(state: &MatchState) -> Result<(), RejectedShot> {
    match state.phase {
        MatchPhase::Idle => Ok(()),
        MatchPhase::Resolving | MatchPhase::Evaluating => Err(RejectedShot::ShotInProgress),
        MatchPhase::GameOver { .. } => Err(RejectedShot::GameOver),
    }
}

/// Nearest in-play disc of the current player within reach of `point`.
///
/// Equal distances resolve to the disc that comes first in the store.
pub fn select_disc(state: &MatchState, point: Vec2, tuning: &ShotTuning) -> Option<u32> {
    let mut best: Option<(u32, f32)> = None;
    for disc in &state.discs {
        if !disc.in_play || disc.owner != state.turn {
            continue;
        }
        let dist = disc.pos.distance(point);
        if dist > disc.radius() * tuning.selection_reach {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((disc.id(), dist));
        }
    }
    best.map(|(id, _)| id)
}

/// Gesture start: select a disc under the press point
pub fn press(
    state: &mut MatchState,
    point: Vec2,
    tuning: &ShotTuning,
) -> Result<u32, RejectedShot> {
    ensure_can_shoot(state)?;
    let disc_id = select_disc(state, point, tuning).ok_or(RejectedShot::NoEligibleDisc)?;
    state.drag = Some(DragState {
        disc_id,
        press: point,
        current: point,
    });
    Ok(disc_id)
}

/// Track the drag point. No entity changes.
pub fn drag_to(state: &mut MatchState, point: Vec2) -> Result<(), RejectedShot> {
    let drag = state.drag.as_mut().ok_or(RejectedShot::NoActiveDrag)?;
    drag.current = point;
    Ok(())
}

/// Drop the gesture without shooting
pub fn cancel_drag(state: &mut MatchState) {
    state.drag = None;
}

/// Gesture end: fire the selected disc
pub fn release(state: &mut MatchState, point: Vec2, tuning: &Tuning) -> Result<Shot, RejectedShot> {
    let drag = state.drag.take().ok_or(RejectedShot::NoActiveDrag)?;
    ensure_can_shoot(state)?;
    fire(state, drag.disc_id, drag.press - point, tuning)
}

/// Select a disc near `hint` and fire it with `drag` in one step
pub fn start_shot(
    state: &mut MatchState,
    hint: Vec2,
    drag: Vec2,
    tuning: &Tuning,
) -> Result<Shot, RejectedShot> {
    ensure_can_shoot(state)?;
    let disc_id = select_disc(state, hint, &tuning.shot).ok_or(RejectedShot::NoEligibleDisc)?;
    state.drag = None;
    fire(state, disc_id, drag, tuning)
}

/// Drags too short to register, or too weak to move the disc past the
/// stopping threshold, are rejected without costing the turn.
fn fire(
    state: &mut MatchState,
    disc_id: u32,
    drag: Vec2,
    tuning: &Tuning,
) -> Result<Shot, RejectedShot> {
    if !drag.is_finite() || drag.length() < tuning.shot.min_drag.max(crate::consts::EPSILON) {
        return Err(RejectedShot::DragTooShort);
    }
    let shot = Shot::from_drag(disc_id, drag, &tuning.shot);
    if shot.velocity.length() <= tuning.physics.min_speed {
        return Err(RejectedShot::DragTooShort);
    }
    state.book.begin_shot(disc_id);
    state.pending_shot = Some(shot);
    state.phase = MatchPhase::Resolving;
    log::debug!(
        "{} shoots disc {} at {:.0} units/s",
        state.turn,
        disc_id,
        shot.velocity.length()
    );
    Ok(shot)
}
