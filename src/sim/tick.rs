//! Physics step
//!
//! Advances a resolving shot by one timestep: integrate and brake, resolve
//! contacts, eject discs that left the board, then check for a winner and
//! run the turn rules once everything has stopped.

use glam::Vec2;

use super::collision::{pair_mut, resolve_pair};
use super::events::SimEvent;
use super::state::{MatchPhase, MatchState};
use super::turn::{check_match_over, evaluate_shot};
use crate::consts::FRICTION_REFERENCE_FPS;
use crate::tuning::PhysicsTuning;

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<SimEvent>,
    /// Some disc was above the motion threshold this tick
    pub moving: bool,
}

/// Advance the match by `dt` seconds.
///
/// A non-positive or non-finite `dt` is a no-op, as is any phase other than
/// `Resolving` (apart from the win check).
pub fn tick(state: &mut MatchState, tuning: &PhysicsTuning, dt: f32) -> TickReport {
    let mut report = TickReport::default();
    if !dt.is_finite() || dt <= 0.0 {
        return report;
    }

    if state.phase == MatchPhase::Resolving {
        state.time_ticks += 1;
        apply_pending_shot(state, &mut report);
        report.moving = integrate(state, tuning, dt);
        resolve_collisions(state, tuning, &mut report);
        eject_out_of_bounds(state, tuning, &mut report);
    }

    if let Some(winner) = check_match_over(state) {
        report.moving = false;
        report.events.push(SimEvent::MatchOver { winner });
        return report;
    }

    if state.phase == MatchPhase::Resolving && !report.moving {
        state.phase = MatchPhase::Evaluating;
        if let Some((outcome, next_turn)) = evaluate_shot(state) {
            report.events.push(SimEvent::ShotResolved { outcome, next_turn });
        }
    }

    report
}

fn apply_pending_shot(state: &mut MatchState, report: &mut TickReport) {
    let Some(shot) = state.pending_shot.take() else {
        return;
    };
    if let Some(disc) = state.disc_mut(shot.shooter).filter(|d| d.in_play) {
        disc.vel = shot.velocity;
        report.events.push(SimEvent::ShotFired {
            disc: shot.shooter,
            velocity: shot.velocity,
        });
    }
}

/// Move and brake every disc in play. Returns whether any disc moved.
fn integrate(state: &mut MatchState, tuning: &PhysicsTuning, dt: f32) -> bool {
    let frames = dt * FRICTION_REFERENCE_FPS;
    let mut moving = false;

    for disc in state.discs.iter_mut().filter(|d| d.in_play) {
        disc.vel = disc.vel.clamp_length_max(tuning.max_speed);
        let speed = disc.vel.length();
        if speed > tuning.min_speed {
            moving = true;
            disc.pos += disc.vel * dt;
            disc.vel *= tuning.friction_factor(speed).powf(frames);
        } else {
            disc.vel = Vec2::ZERO;
        }
    }

    moving
}

/// Pairwise over discs in play, ascending index order
fn resolve_collisions(state: &mut MatchState, tuning: &PhysicsTuning, report: &mut TickReport) {
    let active: Vec<usize> = state
        .discs
        .iter()
        .enumerate()
        .filter(|(_, d)| d.in_play)
        .map(|(i, _)| i)
        .collect();
    let shooter = state.book.shooter;

    for (n, &i) in active.iter().enumerate() {
        for &j in &active[n + 1..] {
            let (a, b) = pair_mut(&mut state.discs, i, j);
            let Some(contact) = resolve_pair(a, b, tuning) else {
                continue;
            };

            if shooter == Some(a.id()) {
                state.book.struck.insert(b.id());
            }
            if shooter == Some(b.id()) {
                state.book.struck.insert(a.id());
            }
            report.events.push(SimEvent::Collision {
                a: a.id(),
                b: b.id(),
                point: contact.point,
                impulse: contact.impulse,
            });
        }
    }
}

fn eject_out_of_bounds(state: &mut MatchState, tuning: &PhysicsTuning, report: &mut TickReport) {
    let shooter_owner = state.shooter_owner();
    let board = state.board;

    for disc in state.discs.iter_mut().filter(|d| d.in_play) {
        if !board.is_outside(disc.pos, disc.radius(), tuning.eject_margin) {
            continue;
        }
        disc.eject();
        if shooter_owner.is_some_and(|owner| owner != disc.owner) {
            state.book.enemies_ejected += 1;
        }
        log::debug!(
            "Disc {} ({}) ejected at ({:.0}, {:.0})",
            disc.id(),
            disc.owner,
            disc.pos.x,
            disc.pos.y
        );
        report.events.push(SimEvent::DiscEjected {
            id: disc.id(),
            owner: disc.owner,
            pos: disc.pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::RejectedShot;
    use crate::sim::input::start_shot;
    use crate::sim::state::{Board, Dimensions, Disc, Player};
    use crate::sim::turn::ShotOutcome;
    use crate::tuning::{LayoutTuning, ShotTuning, Tuning};

    const RADIUS: f32 = 20.0;

    /// Circular board centered at (500, 500), ejection radius 410
    fn board() -> Board {
        Board {
            center: Vec2::new(500.0, 500.0),
            radius_x: 400.0,
            radius_y: 400.0,
        }
    }

    fn state_with(discs: &[(u32, Player, f32, f32)]) -> MatchState {
        let discs = discs
            .iter()
            .map(|&(id, owner, x, y)| Disc::new(id, owner, Vec2::new(x, y), RADIUS))
            .collect();
        MatchState::with_discs(Dimensions::new(1000.0, 1000.0), board(), discs).unwrap()
    }

    /// Drag length that launches at `speed` with the default cubic curve
    fn drag_for_speed(speed: f32, shot: &ShotTuning) -> f32 {
        (speed / shot.max_shot_speed).cbrt() * shot.max_pull
    }

    fn run_until_settled(state: &mut MatchState, tuning: &PhysicsTuning) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(tick(state, tuning, SIM_DT).events);
            if state.phase != MatchPhase::Resolving {
                return events;
            }
        }
        panic!("shot never settled");
    }

    /// Shooter A at x=835 fires right into the disc at x=895, 15 units from the edge
    fn fire_into_edge_disc(state: &mut MatchState, tuning: &Tuning) {
        let drag = Vec2::new(drag_for_speed(300.0, &tuning.shot), 0.0);
        start_shot(state, Vec2::new(835.0, 500.0), drag, tuning).unwrap();
    }

    #[test]
    fn test_clean_hit_keeps_turn() {
        let tuning = Tuning::default();
        let mut state = state_with(&[
            (1, Player::A, 835.0, 500.0),
            (2, Player::B, 895.0, 500.0),
            (3, Player::A, 500.0, 700.0),
            (4, Player::B, 500.0, 300.0),
        ]);

        fire_into_edge_disc(&mut state, &tuning);
        let events = run_until_settled(&mut state, &tuning.physics);

        assert!(!state.disc(2).unwrap().in_play);
        assert!(state.disc(1).unwrap().in_play);
        assert_eq!(state.phase, MatchPhase::Idle);
        assert_eq!(state.turn, Player::A);
        assert_eq!(state.last_outcome, Some(ShotOutcome::CleanHit));
        assert!(events.iter().any(|e| matches!(e, SimEvent::ShotFired { disc: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::DiscEjected { id: 2, owner: Player::B, .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::ShotResolved {
                outcome: ShotOutcome::CleanHit,
                next_turn: Player::A
            }
        )));
    }

    #[test]
    fn test_friendly_contact_passes_turn() {
        let tuning = Tuning::default();
        let mut state = state_with(&[
            (1, Player::A, 835.0, 500.0),
            (2, Player::A, 895.0, 500.0),
            (3, Player::A, 500.0, 700.0),
            (4, Player::B, 500.0, 300.0),
        ]);

        fire_into_edge_disc(&mut state, &tuning);
        run_until_settled(&mut state, &tuning.physics);

        assert_eq!(state.last_outcome, Some(ShotOutcome::FriendlyContact));
        assert_eq!(state.turn, Player::B);
    }

    #[test]
    fn test_miss_passes_turn() {
        let tuning = Tuning::default();
        let mut state = state_with(&[(1, Player::A, 500.0, 500.0), (2, Player::B, 500.0, 300.0)]);
        let drag = Vec2::new(-drag_for_speed(200.0, &tuning.shot), 0.0);
        start_shot(&mut state, Vec2::new(500.0, 500.0), drag, &tuning).unwrap();
        run_until_settled(&mut state, &tuning.physics);

        assert_eq!(state.last_outcome, Some(ShotOutcome::TurnOver));
        assert_eq!(state.turn, Player::B);
        assert!(state.disc(1).unwrap().pos.x < 500.0);
        assert!(state.book.shooter.is_none());
    }

    #[test]
    fn test_scenario_friendly_and_enemy_struck() {
        let mut state = state_with(&[
            (1, Player::A, 500.0, 500.0),
            (2, Player::A, 600.0, 500.0),
            (3, Player::B, 700.0, 500.0),
            (4, Player::B, 300.0, 500.0),
        ]);
        state.book.begin_shot(1);
        state.book.struck.extend([2, 3]);
        state.book.enemies_ejected = 1;
        state.disc_mut(3).unwrap().eject();
        state.phase = MatchPhase::Evaluating;

        assert_eq!(
            evaluate_shot(&mut state),
            Some((ShotOutcome::FriendlyContact, Player::B))
        );
        assert_eq!(state.phase, MatchPhase::Idle);
    }

    #[test]
    fn test_scenario_two_enemies_ejected_is_overshoot() {
        let mut state = state_with(&[
            (1, Player::A, 500.0, 500.0),
            (2, Player::B, 600.0, 500.0),
            (3, Player::B, 700.0, 500.0),
            (4, Player::B, 300.0, 500.0),
        ]);
        state.book.begin_shot(1);
        state.book.struck.extend([2, 3]);
        state.book.enemies_ejected = 2;
        state.disc_mut(2).unwrap().eject();
        state.disc_mut(3).unwrap().eject();
        state.phase = MatchPhase::Evaluating;

        assert_eq!(evaluate_shot(&mut state), Some((ShotOutcome::Overshoot, Player::B)));
        assert_eq!(state.turn, Player::B);
    }

    #[test]
    fn test_ejecting_last_disc_ends_match() {
        let tuning = Tuning::default();
        let mut state = state_with(&[
            (1, Player::A, 835.0, 500.0),
            (2, Player::B, 895.0, 500.0),
            (3, Player::A, 500.0, 700.0),
        ]);

        fire_into_edge_disc(&mut state, &tuning);
        let events = run_until_settled(&mut state, &tuning.physics);

        assert_eq!(state.phase, MatchPhase::GameOver { winner: Player::A });
        assert_eq!(state.winner(), Some(Player::A));
        assert!(events.contains(&SimEvent::MatchOver { winner: Player::A }));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::ShotResolved { .. })));
        assert!(state.discs.iter().all(|d| d.vel == Vec2::ZERO));

        let err = start_shot(&mut state, Vec2::new(500.0, 700.0), Vec2::X * 100.0, &tuning);
        assert_eq!(err, Err(RejectedShot::GameOver));

        // Further ticks change nothing
        let before = state.discs.clone();
        assert!(tick(&mut state, &tuning.physics, SIM_DT).events.is_empty());
        assert_eq!(state.discs, before);
    }

    #[test]
    fn test_simultaneous_wipeout_goes_to_shooter() {
        let tuning = Tuning::default();
        let mut state = state_with(&[(1, Player::A, 905.0, 500.0), (2, Player::B, 500.0, 905.0)]);
        state.book.begin_shot(1);
        state.phase = MatchPhase::Resolving;
        state.disc_mut(1).unwrap().vel = Vec2::new(600.0, 0.0);
        state.disc_mut(2).unwrap().vel = Vec2::new(0.0, 600.0);

        let report = tick(&mut state, &tuning.physics, SIM_DT);
        assert_eq!(state.winner(), Some(Player::A));
        assert!(report.events.contains(&SimEvent::MatchOver { winner: Player::A }));
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let tuning = Tuning::default();
        let mut state =
            MatchState::new(Dimensions::new(1600.0, 900.0), &LayoutTuning::default()).unwrap();
        let before = state.discs.clone();
        let report = tick(&mut state, &tuning.physics, SIM_DT);
        assert!(report.events.is_empty());
        assert_eq!(state.discs, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let tuning = Tuning::default();
        let mut state = state_with(&[(1, Player::A, 500.0, 500.0), (2, Player::B, 500.0, 300.0)]);
        state.book.begin_shot(1);
        state.phase = MatchPhase::Resolving;
        state.disc_mut(1).unwrap().vel = Vec2::new(-90_000.0, 0.0);

        tick(&mut state, &tuning.physics, SIM_DT);
        let disc = state.disc(1).unwrap();
        assert!((500.0 - disc.pos.x) <= tuning.physics.max_speed * SIM_DT + 1e-3);
        assert!(disc.vel.length() <= tuning.physics.max_speed);
    }

    #[test]
    fn test_slow_disc_stops_outright() {
        let tuning = Tuning::default();
        let mut state = state_with(&[(1, Player::A, 500.0, 500.0), (2, Player::B, 500.0, 300.0)]);
        state.book.begin_shot(1);
        state.phase = MatchPhase::Resolving;
        state.disc_mut(1).unwrap().vel = Vec2::new(tuning.physics.min_speed * 0.5, 0.0);

        let report = tick(&mut state, &tuning.physics, SIM_DT);
        assert!(!report.moving);
        assert_eq!(state.disc(1).unwrap().vel, Vec2::ZERO);
        assert_eq!(state.disc(1).unwrap().pos, Vec2::new(500.0, 500.0));
        assert_eq!(state.phase, MatchPhase::Idle);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let run = || {
            let mut state =
                MatchState::new(Dimensions::new(1600.0, 900.0), &LayoutTuning::default()).unwrap();
            let shooter = state.discs[4].pos;
            start_shot(&mut state, shooter, Vec2::new(390.0, 25.0), &tuning).unwrap();
            for _ in 0..600 {
                tick(&mut state, &tuning.physics, SIM_DT);
            }
            state
        };

        let first = run();
        let second = run();
        assert_eq!(first.discs, second.discs);
        assert_eq!(first.turn, second.turn);
        assert_eq!(first.phase, second.phase);
    }

    /// Full-size match with one shot in flight
    fn shot_in_flight(disc_index: usize, angle: f32, pull: f32) -> (MatchState, Tuning) {
        let tuning = Tuning::default();
        let mut state = MatchState::new(Dimensions::new(1600.0, 900.0), &tuning.layout).unwrap();
        let hint = state.discs[disc_index].pos;
        let drag = Vec2::from_angle(angle) * pull;
        let _ = start_shot(&mut state, hint, drag, &tuning);
        (state, tuning)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_disc_invariants_hold(
            slot in 0usize..5,
            angle in -std::f32::consts::PI..std::f32::consts::PI,
            pull in 20.0f32..600.0,
            ticks in 1usize..400,
        ) {
            // Even slots are player A's discs
            let (mut state, tuning) = shot_in_flight(slot * 2, angle, pull);
            let radii: Vec<(u32, f32)> = state.discs.iter().map(|d| (d.id(), d.radius())).collect();
            let mut ejected = BTreeSet::new();

            for _ in 0..ticks {
                tick(&mut state, &tuning.physics, SIM_DT);

                let now: Vec<(u32, f32)> =
                    state.discs.iter().map(|d| (d.id(), d.radius())).collect();
                prop_assert_eq!(&now, &radii);

                let active_ids: BTreeSet<u32> =
                    state.discs.iter().filter(|d| d.in_play).map(|d| d.id()).collect();
                prop_assert_eq!(active_ids.len(), state.discs.iter().filter(|d| d.in_play).count());

                for disc in &state.discs {
                    if ejected.contains(&disc.id()) {
                        prop_assert!(!disc.in_play);
                    }
                    if !disc.in_play {
                        ejected.insert(disc.id());
                    }
                }
            }
        }

        #[test]
        fn prop_zero_dt_tick_is_idempotent(
            angle in -std::f32::consts::PI..std::f32::consts::PI,
            pull in 20.0f32..600.0,
            warmup in 0usize..120,
            repeats in 1usize..20,
        ) {
            let (mut state, tuning) = shot_in_flight(4, angle, pull);
            for _ in 0..warmup {
                tick(&mut state, &tuning.physics, SIM_DT);
            }

            let discs = state.discs.clone();
            let phase = state.phase;
            for _ in 0..repeats {
                let report = tick(&mut state, &tuning.physics, 0.0);
                prop_assert!(report.events.is_empty());
            }
            prop_assert_eq!(&state.discs, &discs);
            prop_assert_eq!(state.phase, phase);
        }
    }
}
