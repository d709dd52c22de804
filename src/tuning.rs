//! Data-driven game balance
//!
//! Friction, restitution and shot power are tuning values, not rules. They
//! load from JSON so a match can be re-balanced without touching the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// One band of the speed-tiered friction model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionTier {
    /// Tier applies at or above this speed (units/s)
    pub min_speed: f32,
    /// Velocity multiplier per reference frame (0-1]
    pub factor: f32,
}

impl FrictionTier {
    pub const fn new(min_speed: f32, factor: f32) -> Self {
        Self { min_speed, factor }
    }
}

/// Disc motion and contact response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Speed clamp applied before integration (units/s)
    pub max_speed: f32,
    /// At or below this speed a disc is stopped outright
    pub min_speed: f32,
    /// Friction bands, fastest first. Slower bands brake harder.
    pub friction: Vec<FrictionTier>,
    /// Coefficient of restitution for disc-disc impacts
    pub restitution: f32,
    /// Positional correction cap as a fraction of disc radius
    pub overlap_cap: f32,
    /// Flat velocity multiplier applied to both discs after an impulse
    pub collision_damping: f32,
    /// Extra ejection margin beyond the board edge, in disc radii
    pub eject_margin: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            max_speed: 1500.0,
            min_speed: 3.0,
            friction: vec![
                FrictionTier::new(600.0, 0.985),
                FrictionTier::new(200.0, 0.97),
                FrictionTier::new(40.0, 0.95),
                FrictionTier::new(0.0, 0.90),
            ],
            restitution: 0.35,
            overlap_cap: 0.3,
            collision_damping: 1.0,
            eject_margin: 0.5,
        }
    }
}

impl PhysicsTuning {
    /// Per-frame friction factor for a disc moving at `speed`
    pub fn friction_factor(&self, speed: f32) -> f32 {
        self.friction
            .iter()
            .find(|tier| speed >= tier.min_speed)
            .or(self.friction.last())
            .map(|tier| tier.factor)
            .unwrap_or(1.0)
    }
}

/// Drag-to-shoot mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTuning {
    /// Press must land within this many radii of a disc center
    pub selection_reach: f32,
    /// Drags shorter than this are ignored
    pub min_drag: f32,
    /// Pull distance that yields full power
    pub max_pull: f32,
    /// Launch speed at full pull (units/s)
    pub max_shot_speed: f32,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self {
            selection_reach: 1.5,
            min_drag: 1.0,
            max_pull: 400.0,
            max_shot_speed: 1500.0,
        }
    }
}

/// Board and starting formation, all relative to the surface size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    pub discs_per_player: u32,
    /// Board semi-axis as a fraction of half the surface width
    pub board_fill_x: f32,
    /// Board semi-axis as a fraction of half the surface height
    pub board_fill_y: f32,
    /// Disc radius as a fraction of the shorter board semi-axis
    pub disc_radius_fraction: f32,
    /// Column distance from center as a fraction of the horizontal semi-axis
    pub column_offset: f32,
    /// Center-to-center spacing within a column, in disc radii
    pub disc_spacing: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            discs_per_player: 5,
            board_fill_x: 0.9,
            board_fill_y: 0.8,
            disc_radius_fraction: 0.12,
            column_offset: 0.5,
            disc_spacing: 2.5,
        }
    }
}

/// Complete engine tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub shot: ShotTuning,
    pub layout: LayoutTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        check(p.max_speed > 0.0, "physics.max_speed must be positive")?;
        check(
            p.min_speed >= 0.0 && p.min_speed < p.max_speed,
            "physics.min_speed must be in [0, max_speed)",
        )?;
        check(!p.friction.is_empty(), "physics.friction needs at least one tier")?;
        check(
            p.friction.iter().all(|t| t.factor > 0.0 && t.factor <= 1.0),
            "physics.friction factors must be in (0, 1]",
        )?;
        check(
            p.friction.windows(2).all(|w| w[0].min_speed > w[1].min_speed),
            "physics.friction tiers must be ordered fastest first",
        )?;
        check(
            (0.0..=1.0).contains(&p.restitution),
            "physics.restitution must be in [0, 1]",
        )?;
        check(p.overlap_cap > 0.0, "physics.overlap_cap must be positive")?;
        check(
            p.collision_damping > 0.0 && p.collision_damping <= 1.0,
            "physics.collision_damping must be in (0, 1]",
        )?;
        check(p.eject_margin >= 0.0, "physics.eject_margin must not be negative")?;

        let s = &self.shot;
        check(s.selection_reach > 0.0, "shot.selection_reach must be positive")?;
        check(s.min_drag >= 0.0, "shot.min_drag must not be negative")?;
        check(s.max_pull > 0.0, "shot.max_pull must be positive")?;
        check(s.max_shot_speed > 0.0, "shot.max_shot_speed must be positive")?;

        let l = &self.layout;
        check(l.discs_per_player >= 1, "layout.discs_per_player must be at least 1")?;
        for (value, name) in [
            (l.board_fill_x, "layout.board_fill_x"),
            (l.board_fill_y, "layout.board_fill_y"),
            (l.disc_radius_fraction, "layout.disc_radius_fraction"),
            (l.column_offset, "layout.column_offset"),
        ] {
            check(
                value > 0.0 && value <= 1.0,
                &format!("{name} must be in (0, 1]"),
            )?;
        }
        check(l.disc_spacing >= 2.0, "layout.disc_spacing must keep discs apart (>= 2)")?;
        Ok(())
    }
}

fn check(ok: bool, message: &str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::Invalid(message.to_string()))
    }
}
