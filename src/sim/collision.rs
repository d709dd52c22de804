//! Disc-disc collision detection and response
//!
//! Equal-mass circles: overlapping pairs are pushed apart along the contact
//! normal and, when approaching, exchange an impulse scaled by restitution.

use glam::Vec2;

use super::state::Disc;
use crate::tuning::PhysicsTuning;

/// Result of a resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Midpoint between the two centers after correction
    pub point: Vec2,
    /// Unit normal from the first disc toward the second
    pub normal: Vec2,
    /// Penetration before correction
    pub overlap: f32,
    /// Impulse magnitude applied to each disc (0 if separating)
    pub impulse: f32,
}

/// Resolve one pair of discs. Returns `None` if they do not overlap.
///
/// Coincident centers are skipped: there is no usable normal.
pub fn resolve_pair(a: &mut Disc, b: &mut Disc, tuning: &PhysicsTuning) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius() + b.radius();
    if dist >= min_dist || dist <= 0.0 {
        return None;
    }

    let normal = delta / dist;
    let overlap = min_dist - dist;

    // Capped so deep overlaps do not teleport discs through each other
    let correction = overlap.min(a.radius() * tuning.overlap_cap) / 2.0;
    a.pos -= normal * correction;
    b.pos += normal * correction;

    let vel_along_normal = (b.vel - a.vel).dot(normal);
    let mut impulse = 0.0;
    if vel_along_normal < 0.0 {
        impulse = -(1.0 + tuning.restitution) * vel_along_normal / 2.0;
        a.vel -= normal * impulse;
        b.vel += normal * impulse;
        if tuning.collision_damping < 1.0 {
            a.vel *= tuning.collision_damping;
            b.vel *= tuning.collision_damping;
        }
    }

    Some(Contact {
        point: (a.pos + b.pos) / 2.0,
        normal,
        overlap,
        impulse,
    })
}

/// Mutable references to two distinct discs, `i < j`
pub fn pair_mut(discs: &mut [Disc], i: usize, j: usize) -> (&mut Disc, &mut Disc) {
    debug_assert!(i < j);
    let (head, tail) = discs.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
