//! Arena settings
//!
//! Field size, grid resolution, actor sizing and spawn pacing. Loaded from
//! JSON; missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_STEP, SPAWN_ATTEMPTS};
use crate::error::{ArenaError, Result};
use crate::sim::Bounds;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    // === Play field ===
    /// Field width (x spans 0..width)
    pub field_width: f32,
    /// Field height (y spans 0..height, actors descend toward 0)
    pub field_height: f32,

    // === Spatial grid ===
    /// Cell width, roughly 1.25x an actor's width
    pub cell_width: f32,
    /// Cell height, roughly 1.25x an actor's height
    pub cell_height: f32,

    // === Actors ===
    /// Inactive actors created up front
    pub pool_size: usize,
    /// Fastest crossing time (seconds)
    pub min_duration: f32,
    /// Slowest crossing time (seconds)
    pub max_duration: f32,
    pub actor_half_width: f32,
    pub actor_half_height: f32,
    /// Displacement floor per tick
    pub min_step: f32,

    // === Spawning ===
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Placement attempts before a spawn is rejected
    pub spawn_attempts: u32,
    /// RNG seed for spawn positions and durations
    pub seed: u64,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            field_width: 1280.0,
            field_height: 720.0,

            cell_width: 100.0,
            cell_height: 190.0,

            pool_size: 50,
            min_duration: 2.0,
            max_duration: 8.0,
            actor_half_width: 40.0,
            actor_half_height: 76.0,
            min_step: MIN_STEP,

            spawn_interval: 1.0,
            spawn_attempts: SPAWN_ATTEMPTS,
            seed: 0x5eed,
        }
    }
}

impl ArenaSettings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The play field as a bounding box
    pub fn field_bounds(&self) -> Bounds {
        Bounds::new(0.0, self.field_width, 0.0, self.field_height)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ArenaError::InvalidSettings(format!(
                    "{name} must be finite and > 0 (got {v})"
                )))
            }
        };

        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("cell_width", self.cell_width)?;
        positive("cell_height", self.cell_height)?;
        positive("min_duration", self.min_duration)?;
        positive("max_duration", self.max_duration)?;
        positive("actor_half_width", self.actor_half_width)?;
        positive("actor_half_height", self.actor_half_height)?;
        positive("spawn_interval", self.spawn_interval)?;

        if self.min_duration > self.max_duration {
            return Err(ArenaError::InvalidSettings(format!(
                "min_duration ({}) exceeds max_duration ({})",
                self.min_duration, self.max_duration
            )));
        }
        if self.min_duration.ceil() > self.max_duration.floor() {
            return Err(ArenaError::InvalidSettings(format!(
                "no whole second between min_duration ({}) and max_duration ({})",
                self.min_duration, self.max_duration
            )));
        }
        if !(self.min_step.is_finite() && self.min_step >= 0.0) {
            return Err(ArenaError::InvalidSettings(format!(
                "min_step must be finite and >= 0 (got {})",
                self.min_step
            )));
        }
        if self.spawn_attempts == 0 {
            return Err(ArenaError::InvalidSettings(
                "spawn_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
