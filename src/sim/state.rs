//! Arena state and core simulation types
//!
//! Everything the tick mutates lives here: the grid, the active actors and
//! the pool of inactive ones. Nothing is global.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, Bug};
use super::grid::{CollisionGrid, CollisionManager};
use super::shape::{Bounds, Point};
use crate::error::Result;
use crate::settings::ArenaSettings;

/// Something the presentation layer may want to react to (score, sounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    /// Actor entered play above the field
    Spawned { id: ActorId },
    /// Actor left through the bottom of the field
    Escaped { id: ActorId },
    /// Actor eliminated by a pointer press at `at`
    Squashed { id: ActorId, at: Point },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct ArenaState {
    pub settings: ArenaSettings,
    /// Rebuilt from `active` before every query pass
    pub grid: CollisionGrid<ActorId>,
    /// Active actors, iterated in id order for determinism
    pub active: BTreeMap<ActorId, Bug>,
    /// Inactive actors kept for reuse
    pub pool: Vec<Bug>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds accumulated toward the next spawn
    pub spawn_timer: f32,
    /// Events since the last drain
    pub events: Vec<ArenaEvent>,
    rng: Pcg32,
    next_id: ActorId,
}

impl ArenaState {
    /// Validate `settings`, build the grid and fill the pool
    pub fn new(settings: ArenaSettings) -> Result<Self> {
        settings.validate()?;

        let grid = CollisionGrid::new(
            settings.field_bounds(),
            settings.cell_width,
            settings.cell_height,
        )?;

        let mut state = Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            grid,
            active: BTreeMap::new(),
            pool: Vec::new(),
            time_ticks: 0,
            spawn_timer: 0.0,
            events: Vec::new(),
            next_id: 1,
        };

        for _ in 0..state.settings.pool_size {
            let bug = state.new_bug()?;
            state.pool.push(bug);
        }
        log::info!(
            "Arena {}x{} ready, {} pooled actors",
            state.settings.field_width,
            state.settings.field_height,
            state.pool.len()
        );

        Ok(state)
    }

    /// Allocate a new actor ID
    pub fn next_entity_id(&mut self) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create an inactive bug with a random crossing duration (whole seconds)
    pub fn new_bug(&mut self) -> Result<Bug> {
        let id = self.next_entity_id();
        let lo = self.settings.min_duration.ceil() as u32;
        let hi = self.settings.max_duration.floor() as u32;
        let duration = self.rng.random_range(lo..=hi) as f32;
        Bug::new(
            id,
            duration,
            self.settings.actor_half_width,
            self.settings.actor_half_height,
            self.settings.field_height,
        )
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn field_bounds(&self) -> Bounds {
        self.settings.field_bounds()
    }

    /// Clear the grid and register every active actor's current shape
    pub fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (&id, bug) in &self.active {
            self.grid.add(id, bug.shape());
        }
    }

    /// Register `bug` as active
    pub fn activate(&mut self, bug: Bug) {
        let id = bug.id;
        self.grid.add(id, bug.shape());
        self.active.insert(id, bug);
        self.events.push(ArenaEvent::Spawned { id });
    }

    /// Move an actor back to the pool. Unknown IDs are ignored.
    pub fn deactivate(&mut self, id: ActorId) -> Option<&Bug> {
        self.grid.remove(id);
        let bug = self.active.remove(&id)?;
        self.pool.push(bug);
        self.pool.last()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Take the events accumulated since the last call
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }
}
