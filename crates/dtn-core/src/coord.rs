//! Planar world coordinates.
//!
//! The simulated world is a bounded 2-D rectangle; positions are plain
//! Euclidean `f64` pairs.  Double precision matters here: the in-range test
//! compares a distance against a configured radio range with a closed upper
//! bound, and scan timing compares accumulated `f64` sums for equality, so we
//! do not trade precision for memory the way a geographic store could.

/// A point on the simulation plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// The point reached by moving `(dx, dy)` from here.
    #[inline]
    pub fn translated(self, dx: f64, dy: f64) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
