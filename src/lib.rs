//! Chapas - a two-player disc-flicking duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (disc physics, board ejection, turn rules)
//! - `engine`: Lock-friendly facade and render snapshots
//! - `platform`: Fixed-cadence scheduler thread
//! - `tuning`: Data-driven physics, shot and layout balance
//! - `autoplay`: Optional synthetic shot strategy for demos

pub mod autoplay;
pub mod engine;
pub mod error;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, SharedEngine, Snapshot};
pub use error::{ChapasError, GeometryError, RejectedShot, SchedulerError, TuningError};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target simulation cadence (ticks per second)
    pub const TARGET_FPS: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TARGET_FPS as f32;
    /// Largest measured delta handed to the physics step (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.05;

    /// Friction factors are tuned per frame at this rate
    pub const FRICTION_REFERENCE_FPS: f32 = 60.0;

    /// Squared speeds below this are treated as no velocity at all
    pub const EPSILON: f32 = 1e-6;
}

/// Squared normalized distance of `offset` inside an axis-aligned ellipse
/// with semi-axes `limits`. Values above 1.0 lie outside.
#[inline]
pub fn ellipse_norm_sq(offset: Vec2, limits: Vec2) -> f32 {
    let nx = offset.x / limits.x;
    let ny = offset.y / limits.y;
    nx * nx + ny * ny
}

/// Cubic ease-in of a normalized value in [0, 1]
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}
