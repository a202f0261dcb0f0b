//! Movement-model seam.
//!
//! Real movement models (random waypoint, map-based, trace replay) are a
//! separate concern; the stepping core only needs "given where the host is
//! and how much time passed, where is it now".  The two models here are the
//! trivial ones every simulation setup and test needs.

use dtn_core::Coord;

/// Producer of host coordinates, advanced once per movement pass.
pub trait MovementModel {
    /// The host's position after `elapsed` seconds starting from `from`.
    fn step(&mut self, from: Coord, elapsed: f64) -> Coord;
}

/// A host that never moves.
pub struct StationaryMovement;

impl MovementModel for StationaryMovement {
    fn step(&mut self, from: Coord, _elapsed: f64) -> Coord {
        from
    }
}

/// Straight-line motion at a constant velocity (world units per second).
pub struct LinearMovement {
    pub vx: f64,
    pub vy: f64,
}

impl LinearMovement {
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }
}

impl MovementModel for LinearMovement {
    fn step(&mut self, from: Coord, elapsed: f64) -> Coord {
        from.translated(self.vx * elapsed, self.vy * elapsed)
    }
}
