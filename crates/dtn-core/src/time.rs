//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically non-decreasing `f64` second count held in
//! `SimClock`.  There is no process-wide clock instance: the world owns its
//! clock and passes the current time into every entry point that needs it, so
//! several independent runs can coexist in one process.
//!
//! The one sanctioned exception to monotonicity is movement warm-up, where the
//! clock is pre-set to a negative value and driven up to exactly zero before
//! the run proper starts.

use std::fmt;

/// The simulation clock.  Mutated only by the world's stepping code.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    time: f64,
}

impl SimClock {
    /// A clock at time zero.
    pub fn new() -> Self {
        Self { time: 0.0 }
    }

    /// Current simulation time in seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current simulation time floored to a whole second.
    ///
    /// Negative during warm-up; the floor keeps `-0.5` mapping to `-1` so the
    /// integer time is never ahead of the real one.
    #[inline]
    pub fn int_time(&self) -> i64 {
        self.time.floor() as i64
    }

    /// Jump the clock to an absolute time.
    #[inline]
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Advance the clock by `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.1}", self.time)
    }
}
