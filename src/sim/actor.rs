//! Descending actors ("bugs")
//!
//! A bug owns one [`OrientedRect`] and falls through the field at a speed
//! derived from its crossing duration. Its rotation follows a swing timeline
//! that runs independently of movement and collisions.

use serde::{Deserialize, Serialize};

use super::grid::HasShape;
use super::shape::{Bounds, OrientedRect, Point};
use crate::consts::SWING_HALF_PERIOD;
use crate::error::Result;

/// Stable actor handle, also used as the grid key
pub type ActorId = u32;

/// Back-and-forth rotation between `-amplitude` and `+amplitude` degrees.
///
/// Sweeps the full range in [`SWING_HALF_PERIOD`] seconds, then reverses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    /// Half the swing range (degrees)
    pub amplitude: f32,
    /// Time into the current period (seconds, `0..2 * SWING_HALF_PERIOD`)
    pub phase: f32,
}

impl Swing {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            phase: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + dt).rem_euclid(2.0 * SWING_HALF_PERIOD);
    }

    /// Current rotation in degrees, clockwise positive (sprite convention)
    pub fn degrees(&self) -> f32 {
        let t = self.phase / SWING_HALF_PERIOD;
        let sweep = if t <= 1.0 { t } else { 2.0 - t };
        -self.amplitude + 2.0 * self.amplitude * sweep
    }

    /// Current rotation as a shape angle (radians, counter-clockwise)
    pub fn radians(&self) -> f32 {
        -self.degrees().to_radians()
    }
}

/// A descending actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub id: ActorId,
    /// Seconds needed to cross the field
    pub duration: f32,
    /// Units per second
    pub speed: f32,
    shape: OrientedRect,
    swing: Swing,
}

impl Bug {
    /// Create a bug sized `half_width` x `half_height` that crosses a field of
    /// `field_height` (plus its own height) in `duration` seconds.
    pub fn new(
        id: ActorId,
        duration: f32,
        half_width: f32,
        half_height: f32,
        field_height: f32,
    ) -> Result<Self> {
        let swing = Swing::new(duration);
        let shape = OrientedRect::new(Point::ZERO, half_width, half_height, swing.radians())?;
        let speed = (field_height + 2.0 * half_height) / duration;

        Ok(Self {
            id,
            duration,
            speed,
            shape,
            swing,
        })
    }

    pub fn shape(&self) -> &OrientedRect {
        &self.shape
    }

    pub fn swing(&self) -> Swing {
        self.swing
    }

    pub fn center(&self) -> Point {
        self.shape.center()
    }

    /// Bounding box of the current (rotated) shape
    pub fn bounds(&self) -> Bounds {
        self.shape.minmax()
    }

    /// Highest y reached by the shape
    pub fn top(&self) -> f32 {
        self.bounds().y_max
    }

    /// Restart the swing and apply its rotation (used when spawning)
    pub fn reset_swing(&mut self) {
        self.swing = Swing::new(self.duration);
        self.shape.rotate(self.swing.radians());
    }

    /// Advance the rotation timeline without touching the shape
    pub fn advance_swing(&mut self, dt: f32) {
        self.swing.advance(dt);
    }

    pub fn place_at(&mut self, center: Point) {
        self.shape.set_center(center);
    }

    /// Downward displacement for this tick, never below `min_step`
    pub fn step(&self, dt: f32, min_step: f32) -> f32 {
        (self.speed * dt).max(min_step)
    }

    /// Translate and pick up the swing's current rotation
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.shape.move_by(dx, dy);
        self.shape.rotate(self.swing.radians());
    }
}

impl HasShape for Bug {
    fn shape(&self) -> &OrientedRect {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_swing_triangle_wave() {
        let mut swing = Swing::new(4.0);
        assert_eq!(swing.degrees(), -4.0);

        swing.advance(0.5);
        assert!(swing.degrees().abs() < 1e-5);

        swing.advance(0.5);
        assert!((swing.degrees() - 4.0).abs() < 1e-5);

        swing.advance(0.5);
        assert!(swing.degrees().abs() < 1e-5);

        // Wraps back to the start after a full period
        swing.advance(0.5);
        assert!((swing.degrees() + 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_new_bug_speed_and_rotation() {
        let bug = Bug::new(1, 4.0, 10.0, 20.0, 760.0).unwrap();
        // (760 + 40) / 4
        assert_eq!(bug.speed, 200.0);
        // -4 degrees clockwise is +4 degrees counter-clockwise
        assert!((bug.shape().angle() - 4f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_size_fails() {
        assert!(Bug::new(1, 4.0, 0.0, 20.0, 100.0).is_err());
    }

    #[test]
    fn test_step_has_floor() {
        let bug = Bug::new(1, 8.0, 10.0, 10.0, 780.0).unwrap();
        assert_eq!(bug.step(0.1, 0.2), 10.0);
        assert_eq!(bug.step(0.0, 0.2), 0.2);
    }

    #[test]
    fn test_move_syncs_rotation() {
        let mut bug = Bug::new(1, 6.0, 10.0, 10.0, 100.0).unwrap();
        bug.place_at(Vec2::new(50.0, 50.0));
        let before = bug.shape().angle();

        // The timeline runs on its own; the shape catches up on the next move
        bug.advance_swing(0.5);
        assert_eq!(bug.shape().angle(), before);

        bug.move_by(0.0, -5.0);
        assert_eq!(bug.center(), Vec2::new(50.0, 45.0));
        assert!(bug.shape().angle().abs() < 1e-5);
    }

    #[test]
    fn test_top_tracks_rotation() {
        let mut bug = Bug::new(1, 2.0, 10.0, 10.0, 100.0).unwrap();
        bug.place_at(Vec2::new(0.0, 0.0));
        bug.reset_swing();
        let tilted = bug.top();
        assert!(tilted > 10.0);

        bug.advance_swing(0.5);
        bug.move_by(0.0, 0.0);
        assert!((bug.top() - 10.0).abs() < 1e-4);
    }
}
