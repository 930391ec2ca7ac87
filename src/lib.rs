//! Bugs Arena - a bug-squashing arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, spatial grid, actors, tick)
//! - `settings`: Data-driven field, grid and spawn configuration
//! - `error`: Construction and configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ArenaError, Result};
pub use settings::ArenaSettings;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Overdue spawns caught up in one tick; older backlog is dropped
    pub const MAX_CATCHUP_SPAWNS: u32 = 8;

    /// Smallest downward step per tick, so slow actors still make progress
    pub const MIN_STEP: f32 = 0.2;
    /// Placement attempts before a spawn is rejected
    pub const SPAWN_ATTEMPTS: u32 = 5;

    /// Actors swing their rotation through the full range in this many seconds
    pub const SWING_HALF_PERIOD: f32 = 1.0;
}

/// Rotate `p` counter-clockwise about the origin by `angle` radians
#[inline]
pub fn rotate(p: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(p)
}

/// Rotate `p` counter-clockwise about `pivot` by `angle` radians
#[inline]
pub fn rotate_about(p: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    pivot + rotate(p - pivot, angle)
}
