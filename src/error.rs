//! Error types
//!
//! Rejected gestures are recoverable and simply ignored by callers. Geometry
//! and tuning errors are fatal to setup.

use thiserror::Error;

/// Why a shot gesture was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectedShot {
    #[error("discs are still in motion")]
    ShotInProgress,
    #[error("the match is over")]
    GameOver,
    #[error("no eligible disc near the press point")]
    NoEligibleDisc,
    #[error("no drag in progress")]
    NoActiveDrag,
    #[error("drag too short to shoot")]
    DragTooShort,
}

/// Board or disc layout that cannot hold a match
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    NonPositive { width: f32, height: f32 },
    #[error("board dimensions must be finite")]
    NonFinite,
    #[error("disc {id} needs a positive finite radius, got {radius}")]
    DiscRadius { id: u32, radius: f32 },
    #[error("disc id {0} is used more than once")]
    DuplicateDiscId(u32),
}

/// Tuning file could not be loaded or failed validation
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Top-level error for setup paths
#[derive(Debug, Error)]
pub enum ChapasError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
