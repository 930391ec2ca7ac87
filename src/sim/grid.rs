//! Uniform-grid spatial index
//!
//! The grid partitions the play field into fixed-size cells and records, for
//! every registered key, the cells its bounding box touches. It never stores
//! shapes: queries resolve keys through a [`ShapeLookup`] so the grid cannot
//! drift out of sync with the actors that own the shapes.
//!
//! The grid is ephemeral. The simulation clears it and re-adds every active
//! shape each tick; bucket membership is a broad-phase filter and every query
//! confirms candidates with the exact [`OrientedRect`] predicates.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use super::shape::{Bounds, OrientedRect};
use crate::error::{ArenaError, Result};

/// Anything that owns exactly one collision shape
pub trait HasShape {
    fn shape(&self) -> &OrientedRect;
}

impl HasShape for OrientedRect {
    fn shape(&self) -> &OrientedRect {
        self
    }
}

/// Resolve a grid key to its owner's current shape
pub trait ShapeLookup<K> {
    fn shape_of(&self, key: K) -> Option<&OrientedRect>;
}

impl<K: Ord, T: HasShape> ShapeLookup<K> for BTreeMap<K, T> {
    fn shape_of(&self, key: K) -> Option<&OrientedRect> {
        self.get(&key).map(HasShape::shape)
    }
}

impl<K: Eq + Hash, T: HasShape, H: BuildHasher> ShapeLookup<K> for HashMap<K, T, H> {
    fn shape_of(&self, key: K) -> Option<&OrientedRect> {
        self.get(&key).map(HasShape::shape)
    }
}

/// Collision manager contract used by the simulation.
///
/// Lookups of unknown keys are never errors: `remove` reports `false` and the
/// queries yield nothing.
pub trait CollisionManager<K: Copy> {
    /// Register `key` with the cells covered by `shape`. Re-adding a key
    /// replaces its previous registration.
    fn add(&mut self, key: K, shape: &OrientedRect);

    /// Forget `key`. Returns whether it was registered.
    fn remove(&mut self, key: K) -> bool;

    /// Drop every registration.
    fn clear(&mut self);

    /// True if `key` is currently registered
    fn knows(&self, key: K) -> bool;

    /// Registered keys whose shapes overlap the shape of `key`, excluding `key`.
    fn iter_colliding<'a, S: ShapeLookup<K>>(
        &'a self,
        key: K,
        shapes: &'a S,
    ) -> impl Iterator<Item = K>;

    /// Registered keys whose shapes strictly contain `(x, y)`.
    fn objs_touching_point<'a, S: ShapeLookup<K>>(
        &'a self,
        x: f32,
        y: f32,
        shapes: &'a S,
    ) -> impl Iterator<Item = K>;

    /// Registered keys whose shapes are within `near_distance` of the shape of `key`.
    fn objs_near<'a, S: ShapeLookup<K>>(
        &'a self,
        key: K,
        near_distance: f32,
        shapes: &'a S,
    ) -> impl Iterator<Item = K>;

    /// Narrow-phase check, independent of registration
    fn they_collide(&self, a: &OrientedRect, b: &OrientedRect) -> bool {
        a.overlaps(b)
    }
}

type CellIndex = (i32, i32);

/// Hash-mapped cell buckets over a rectangular world
#[derive(Debug, Clone)]
pub struct CollisionGrid<K> {
    world: Bounds,
    cell_width: f32,
    cell_height: f32,
    /// Cell -> keys whose bounding box touches it
    cells: HashMap<CellIndex, Vec<K>>,
    /// Key -> cells it was registered in
    registered: HashMap<K, Vec<CellIndex>>,
}

impl<K: Copy + Ord + Hash> CollisionGrid<K> {
    /// Build a grid over `world` with cells of `cell_width` x `cell_height`.
    ///
    /// Shapes outside `world` are still indexed; they land in cells with
    /// negative or out-of-range indices.
    pub fn new(world: Bounds, cell_width: f32, cell_height: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(cell_width) || !valid(cell_height) {
            return Err(ArenaError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }

        Ok(Self {
            world,
            cell_width,
            cell_height,
            cells: HashMap::new(),
            registered: HashMap::new(),
        })
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Registered keys in ascending order
    pub fn known_objs(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.registered.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> CellIndex {
        (
            ((x - self.world.x_min) / self.cell_width).floor() as i32,
            ((y - self.world.y_min) / self.cell_height).floor() as i32,
        )
    }

    /// Every cell index covered by `bounds`
    fn cells_covering(&self, bounds: &Bounds) -> impl Iterator<Item = CellIndex> {
        let (i0, j0) = self.cell_of(bounds.x_min, bounds.y_min);
        let (i1, j1) = self.cell_of(bounds.x_max, bounds.y_max);
        (i0..=i1).flat_map(move |i| (j0..=j1).map(move |j| (i, j)))
    }

    /// Deduplicated keys sharing a cell with `bounds`, sorted, minus `exclude`
    fn candidates(&self, bounds: &Bounds, exclude: K) -> Vec<K> {
        let mut found: Vec<K> = self
            .cells_covering(bounds)
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .filter(|&k| k != exclude)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Bounding box of a registered key's current shape
    fn registered_bounds<S: ShapeLookup<K>>(&self, key: K, shapes: &S) -> Option<Bounds> {
        if !self.knows(key) {
            return None;
        }
        shapes.shape_of(key).map(OrientedRect::minmax)
    }
}

impl<K: Copy + Ord + Hash> CollisionManager<K> for CollisionGrid<K> {
    fn add(&mut self, key: K, shape: &OrientedRect) {
        self.remove(key);

        let cells: Vec<CellIndex> = self.cells_covering(&shape.minmax()).collect();
        for &cell in &cells {
            self.cells.entry(cell).or_default().push(key);
        }
        self.registered.insert(key, cells);
    }

    fn remove(&mut self, key: K) -> bool {
        let Some(cells) = self.registered.remove(&key) else {
            return false;
        };

        for cell in cells {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|&k| k != key);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        true
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.registered.clear();
    }

    fn knows(&self, key: K) -> bool {
        self.registered.contains_key(&key)
    }

    fn iter_colliding<'a, S: ShapeLookup<K>>(
        &'a self,
        key: K,
        shapes: &'a S,
    ) -> impl Iterator<Item = K> {
        let candidates = self
            .registered_bounds(key, shapes)
            .map(|bounds| self.candidates(&bounds, key))
            .unwrap_or_default();

        candidates.into_iter().filter(move |&other| {
            match (shapes.shape_of(key), shapes.shape_of(other)) {
                (Some(shape), Some(other_shape)) => shape.overlaps(other_shape),
                _ => false,
            }
        })
    }

    fn objs_touching_point<'a, S: ShapeLookup<K>>(
        &'a self,
        x: f32,
        y: f32,
        shapes: &'a S,
    ) -> impl Iterator<Item = K> {
        let bucket = self
            .cells
            .get(&self.cell_of(x, y))
            .map(Vec::as_slice)
            .unwrap_or_default();

        bucket.iter().copied().filter(move |&k| {
            shapes
                .shape_of(k)
                .is_some_and(|shape| shape.touches_point(x, y))
        })
    }

    fn objs_near<'a, S: ShapeLookup<K>>(
        &'a self,
        key: K,
        near_distance: f32,
        shapes: &'a S,
    ) -> impl Iterator<Item = K> {
        let candidates = self
            .registered_bounds(key, shapes)
            .map(|bounds| self.candidates(&bounds.inflate(near_distance.max(0.0)), key))
            .unwrap_or_default();

        candidates.into_iter().filter(move |&other| {
            match (shapes.shape_of(key), shapes.shape_of(other)) {
                (Some(shape), Some(other_shape)) => shape.near_than(other_shape, near_distance),
                _ => false,
            }
        })
    }
}
