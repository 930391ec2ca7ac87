//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod grid;
pub mod shape;
pub mod state;
pub mod tick;

pub use actor::{ActorId, Bug, Swing};
pub use grid::{CollisionGrid, CollisionManager, HasShape, ShapeLookup};
pub use shape::{Bounds, OrientedRect, Point};
pub use state::{ArenaEvent, ArenaState};
pub use tick::{TickInput, hit_test, move_actors, spawn, spawn_check, tick};
