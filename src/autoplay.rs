//! Synthetic shooters for demos and soak runs
//!
//! A strategy only reads snapshots and answers with a press point and a drag
//! vector, the same inputs a human gesture produces.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::engine::{DiscView, PhaseView, Snapshot};
use crate::tuning::ShotTuning;

/// A planned shot: where to press and which way to pull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPlan {
    pub hint: Vec2,
    pub drag: Vec2,
}

pub trait ShotStrategy {
    /// Plan a shot for whoever holds the turn, or `None` if nothing can shoot
    fn plan(&mut self, snapshot: &Snapshot) -> Option<ShotPlan>;
}

/// Shoots the closest own/enemy pair, with a little noise on pull and aim
pub struct NearestTarget {
    rng: Pcg32,
    max_pull: f32,
    /// Pull range as fractions of `max_pull`
    pull: (f32, f32),
    /// Aim noise in radians, either side
    spread: f32,
}

impl NearestTarget {
    pub fn new(seed: u64, tuning: &ShotTuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            max_pull: tuning.max_pull,
            pull: (0.7, 0.95),
            spread: 0.05,
        }
    }

    fn closest_pair<'a>(snapshot: &'a Snapshot) -> Option<(&'a DiscView, &'a DiscView)> {
        let mut best: Option<(&DiscView, &DiscView, f32)> = None;
        for own in snapshot.active_discs().filter(|d| d.owner == snapshot.turn) {
            for enemy in snapshot.active_discs().filter(|d| d.owner != snapshot.turn) {
                let dist = own.pos.distance_squared(enemy.pos);
                if best.is_none_or(|(_, _, d)| dist < d) {
                    best = Some((own, enemy, dist));
                }
            }
        }
        best.map(|(own, enemy, _)| (own, enemy))
    }
}

impl ShotStrategy for NearestTarget {
    fn plan(&mut self, snapshot: &Snapshot) -> Option<ShotPlan> {
        if snapshot.phase != PhaseView::Idle {
            return None;
        }
        let (own, enemy) = Self::closest_pair(snapshot)?;
        let aim = (enemy.pos - own.pos).normalize_or_zero();
        if aim == Vec2::ZERO {
            return None;
        }

        let jitter = self.rng.random_range(-self.spread..=self.spread);
        let pull = self.rng.random_range(self.pull.0..=self.pull.1) * self.max_pull;
        Some(ShotPlan {
            hint: own.pos,
            drag: Vec2::from_angle(jitter).rotate(aim) * pull,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::engine::Engine;
    use crate::sim::{Dimensions, Player};
    use crate::tuning::Tuning;

    fn engine() -> Engine {
        Engine::new(Dimensions::new(1600.0, 900.0), Tuning::default()).unwrap()
    }

    #[test]
    fn test_plan_aims_own_disc_at_enemy() {
        let engine = engine();
        let snapshot = engine.snapshot();
        let mut strategy = NearestTarget::new(7, &engine.tuning().shot);
        let plan = strategy.plan(&snapshot).unwrap();

        let own = snapshot.discs.iter().find(|d| d.pos == plan.hint).unwrap();
        assert_eq!(own.owner, Player::A);
        // Player A sits on the left, so the pull points right
        assert!(plan.drag.x > 0.0);
        let pull = plan.drag.length();
        assert!(pull >= 0.7 * 400.0 - 1e-3 && pull <= 0.95 * 400.0 + 1e-3);
    }

    #[test]
    fn test_same_seed_same_plans() {
        let engine = engine();
        let snapshot = engine.snapshot();
        let mut a = NearestTarget::new(42, &engine.tuning().shot);
        let mut b = NearestTarget::new(42, &engine.tuning().shot);
        for _ in 0..5 {
            assert_eq!(a.plan(&snapshot), b.plan(&snapshot));
        }
    }

    #[test]
    fn test_no_plan_while_resolving() {
        let mut engine = engine();
        let mut strategy = NearestTarget::new(1, &engine.tuning().shot);
        let plan = strategy.plan(&engine.snapshot()).unwrap();
        engine.start_shot(plan.hint, plan.drag).unwrap();
        assert_eq!(strategy.plan(&engine.snapshot()), None);
    }

    #[test]
    fn test_autoplay_keeps_counts_monotonic() {
        let mut engine = engine();
        let mut strategy = NearestTarget::new(3, &engine.tuning().shot);
        let mut remaining = (5, 5);

        for _ in 0..20 {
            let Some(plan) = strategy.plan(&engine.snapshot()) else {
                break;
            };
            engine.start_shot(plan.hint, plan.drag).unwrap();
            for _ in 0..5000 {
                engine.tick(SIM_DT);
                if engine.snapshot().phase != PhaseView::Resolving {
                    break;
                }
            }
            let snapshot = engine.snapshot();
            assert_ne!(snapshot.phase, PhaseView::Resolving);
            assert!(snapshot.remaining_a <= remaining.0);
            assert!(snapshot.remaining_b <= remaining.1);
            remaining = (snapshot.remaining_a, snapshot.remaining_b);
        }
    }
}
