//! Oriented rectangle geometry
//!
//! A rectangle defined by its center, half extents and a rotation angle
//! (radians, counter-clockwise with y pointing up). The four corners are
//! derived data: every mutator recomputes them from the source fields.
//!
//! Corner winding is clockwise, starting from the top-left corner of the
//! unrotated rectangle:
//!
//! ```text
//!   A ---- B
//!   |  c   |
//!   D ---- C
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::rotate_about;

/// 2D coordinate used throughout the simulation
pub type Point = Vec2;

/// Axis-aligned bounding box as `(x_min, x_max, y_min, y_max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// True if `other` lies within these bounds on all four sides (inclusive)
    pub fn encloses(&self, other: &Bounds) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    /// Grow the box by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Bounds {
        Bounds::new(
            self.x_min - margin,
            self.x_max + margin,
            self.y_min - margin,
            self.y_max + margin,
        )
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Doubled signed area of triangle `(a, b, p)`.
///
/// Positive when `a -> b -> p` turns clockwise.
#[inline]
fn doubled_signed_area(a: Point, b: Point, p: Point) -> f32 {
    (p - a).perp_dot(b - a)
}

/// A rectangle that can be rotated around its center
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrientedRect {
    center: Point,
    half_width: f32,
    half_height: f32,
    angle: f32,
    #[serde(skip)]
    corners: [Point; 4],
}

impl OrientedRect {
    /// Build a rectangle. Half extents must be finite and strictly positive.
    pub fn new(center: Point, half_width: f32, half_height: f32, angle: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(half_width) || !valid(half_height) {
            return Err(ArenaError::InvalidExtents {
                half_width,
                half_height,
            });
        }

        Ok(Self {
            center,
            half_width,
            half_height,
            angle,
            corners: compute_corners(center, half_width, half_height, angle),
        })
    }

    /// Axis-aligned rectangle
    pub fn axis_aligned(center: Point, half_width: f32, half_height: f32) -> Result<Self> {
        Self::new(center, half_width, half_height, 0.0)
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Rotation in radians
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Corners `(A, B, C, D)` in clockwise order
    #[inline]
    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    fn refresh(&mut self) {
        self.corners = compute_corners(self.center, self.half_width, self.half_height, self.angle);
    }

    /// Translate the rectangle
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.center += Vec2::new(dx, dy);
        self.refresh();
    }

    /// Move the center to `center`, keeping extents and angle
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
        self.refresh();
    }

    /// Set the absolute rotation (radians). The center does not move.
    pub fn rotate(&mut self, angle: f32) {
        self.angle = angle;
        self.refresh();
    }

    /// Strict point containment.
    ///
    /// Points on an edge or a corner are outside.
    pub fn contains(&self, p: Point) -> bool {
        let [a, b, c, d] = self.corners;
        doubled_signed_area(a, b, p) > 0.0
            && doubled_signed_area(b, c, p) > 0.0
            && doubled_signed_area(c, d, p) > 0.0
            && doubled_signed_area(d, a, p) > 0.0
    }

    pub fn touches_point(&self, x: f32, y: f32) -> bool {
        self.contains(Point::new(x, y))
    }

    /// Center plus the four corners
    fn sample_points(&self) -> [Point; 5] {
        let [a, b, c, d] = self.corners;
        [self.center, a, b, c, d]
    }

    /// Overlap test by sampling: true if the center or a corner of either
    /// rectangle is strictly inside the other one.
    ///
    /// This is not a separating-axis test. Two rectangles crossing like a
    /// `+` with no sampled point inside the other are reported as disjoint.
    /// A rectangle never overlaps itself.
    pub fn overlaps(&self, other: &OrientedRect) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }

        other.sample_points().iter().any(|&p| self.contains(p))
            || self.sample_points().iter().any(|&p| other.contains(p))
    }

    /// Smallest distance between any corner of `self` and any corner of `other`.
    ///
    /// Not a polygon distance: overlapping rectangles can report a positive value.
    pub fn distance(&self, other: &OrientedRect) -> f32 {
        let mut best = f32::INFINITY;
        for a in self.corners {
            for b in other.corners {
                best = best.min(a.distance_squared(b));
            }
        }
        best.max(0.0).sqrt()
    }

    pub fn near_than(&self, other: &OrientedRect, near_distance: f32) -> bool {
        self.distance(other) <= near_distance
    }

    /// Axis-aligned bounding box of the rotated corners
    pub fn minmax(&self) -> Bounds {
        let [first, rest @ ..] = self.corners;
        let (min, max) = rest
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Bounds::new(min.x, max.x, min.y, max.y)
    }

    /// True if the bounding box lies inside `bounds` on all four sides
    pub fn fits_in_box(&self, bounds: &Bounds) -> bool {
        bounds.encloses(&self.minmax())
    }
}

impl<'de> Deserialize<'de> for OrientedRect {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            center: Point,
            half_width: f32,
            half_height: f32,
            angle: f32,
        }

        let raw = Raw::deserialize(deserializer)?;
        OrientedRect::new(raw.center, raw.half_width, raw.half_height, raw.angle)
            .map_err(serde::de::Error::custom)
    }
}

fn compute_corners(center: Point, half_width: f32, half_height: f32, angle: f32) -> [Point; 4] {
    let unrotated = [
        Vec2::new(center.x - half_width, center.y + half_height),
        Vec2::new(center.x + half_width, center.y + half_height),
        Vec2::new(center.x + half_width, center.y - half_height),
        Vec2::new(center.x - half_width, center.y - half_height),
    ];
    if angle == 0.0 {
        return unrotated;
    }
    unrotated.map(|p| rotate_about(p, center, angle))
}
