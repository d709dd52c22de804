//! Turn arbitration and win detection
//!
//! Once every disc has stopped, the shot is classified and the turn either
//! stays with the shooter (clean hit) or passes to the opponent. Rules are
//! checked in priority order; the first match wins.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{MatchPhase, MatchState, Player};

/// How a shot ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Shooter touched one of its own discs
    FriendlyContact,
    /// Shooter touched more than one opposing disc
    Overshoot,
    /// One opposing disc touched but it stayed on the board
    NoKnockout,
    /// One opposing disc touched and knocked off, shooter survived
    CleanHit,
    /// Anything else, including a clean miss
    TurnOver,
}

impl ShotOutcome {
    /// Whether the shooting player goes again
    pub fn keeps_turn(self) -> bool {
        matches!(self, ShotOutcome::CleanHit)
    }

    /// Short HUD message
    pub fn summary(self) -> &'static str {
        match self {
            ShotOutcome::FriendlyContact => "Friendly fire! Turn lost.",
            ShotOutcome::Overshoot => "Hit too many! Turn lost.",
            ShotOutcome::NoKnockout => "Didn't knock it out. Switch.",
            ShotOutcome::CleanHit => "Clean hit! Shoot again.",
            ShotOutcome::TurnOver => "Switch turns.",
        }
    }
}

/// Everything the rules look at, gathered from the match state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReport {
    pub shooter_owner: Player,
    /// Struck discs owned by the shooter's player
    pub friendly_struck: usize,
    /// Struck discs owned by the opponent
    pub enemy_struck: usize,
    pub enemies_ejected: u32,
    pub shooter_in_play: bool,
}

impl ShotReport {
    /// Struck discs are counted whether or not they were ejected since
    pub fn from_state(state: &MatchState) -> Option<Self> {
        let shooter = state.disc(state.book.shooter?)?;
        let (friendly_struck, enemy_struck) = state
            .book
            .struck
            .iter()
            .filter_map(|&id| state.disc(id))
            .fold((0, 0), |(friendly, enemy), disc| {
                if disc.owner == shooter.owner {
                    (friendly + 1, enemy)
                } else {
                    (friendly, enemy + 1)
                }
            });
        Some(Self {
            shooter_owner: shooter.owner,
            friendly_struck,
            enemy_struck,
            enemies_ejected: state.book.enemies_ejected,
            shooter_in_play: shooter.in_play,
        })
    }
}

/// Classify a finished shot
pub fn classify(report: &ShotReport) -> ShotOutcome {
    if report.friendly_struck > 0 {
        ShotOutcome::FriendlyContact
    } else if report.enemy_struck > 1 {
        ShotOutcome::Overshoot
    } else if report.enemy_struck == 1 && report.enemies_ejected == 0 && report.shooter_in_play {
        ShotOutcome::NoKnockout
    } else if report.enemy_struck == 1 && report.enemies_ejected == 1 && report.shooter_in_play {
        ShotOutcome::CleanHit
    } else {
        ShotOutcome::TurnOver
    }
}

/// Run the turn rules for a settled shot and return to `Idle`.
///
/// Only acts in the `Evaluating` phase. Returns the outcome and the player
/// who shoots next.
pub fn evaluate_shot(state: &mut MatchState) -> Option<(ShotOutcome, Player)> {
    if state.phase != MatchPhase::Evaluating {
        return None;
    }

    let report = ShotReport::from_state(state);
    if let Some(report) = &report {
        log::debug!(
            "Shot by {} struck {} friendly, {} enemy, ejected {}",
            report.shooter_owner,
            report.friendly_struck,
            report.enemy_struck,
            report.enemies_ejected
        );
    }
    let outcome = report.as_ref().map(classify).unwrap_or(ShotOutcome::TurnOver);

    if !outcome.keeps_turn() {
        state.turn = state.turn.opponent();
    }
    state.phase = MatchPhase::Idle;
    state.last_outcome = Some(outcome);
    state.book.clear();

    log::info!("{:?}: {} (next: {})", outcome, outcome.summary(), state.turn);
    Some((outcome, state.turn))
}

/// Declare a winner as soon as either side has no discs left.
///
/// If both sides are wiped out by the same shot, the shooter's player wins.
/// Clears all motion and the pending shot on game over.
pub fn check_match_over(state: &mut MatchState) -> Option<Player> {
    if state.is_over() {
        return None;
    }

    let a_left = state.active_count(Player::A);
    let b_left = state.active_count(Player::B);
    let winner = match (a_left, b_left) {
        (0, 0) => state.shooter_owner().unwrap_or(state.turn),
        (0, _) => Player::B,
        (_, 0) => Player::A,
        _ => return None,
    };

    state.phase = MatchPhase::GameOver { winner };
    state.pending_shot = None;
    state.drag = None;
    for disc in &mut state.discs {
        disc.vel = Vec2::ZERO;
    }
    log::info!("Match over after {} ticks: {} wins", state.time_ticks, winner);
    Some(winner)
}
