//! Error types
//!
//! Only construction and configuration can fail. Lookups that find nothing
//! (removing an unknown key, querying an empty grid) are not errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Invalid half extents: {half_width} x {half_height} (both must be finite and > 0)")]
    InvalidExtents { half_width: f32, half_height: f32 },

    #[error("Invalid grid cell size: {width} x {height} (both must be finite and > 0)")]
    InvalidCellSize { width: f32, height: f32 },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
