//! Platform abstraction layer
//!
//! Handles host-facing concerns the simulation must not know about:
//! - Time/ticks (fixed-cadence scheduler thread)
//! - Attach/detach lifecycle for a rendering surface

pub mod scheduler;

pub use scheduler::{FrameSink, Scheduler, SchedulerConfig, TimingPolicy};
