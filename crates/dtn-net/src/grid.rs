//! The connectivity grid — a spatial hash answering "who might be near me?".
//!
//! # Why this exists
//!
//! The naive in-range test is O(N²) per scan tick.  The grid partitions the
//! plane into square cells whose side is at least the largest transmit range
//! registered for an interface kind; any interface within range of `I` must
//! then sit in `I`'s cell or one of its 8 neighbours, so a range query
//! touches 9 cells regardless of population.
//!
//! Cells are half-open: a point exactly on a boundary belongs to the cell
//! whose lower-bound coordinates it meets (`floor` does this for free, for
//! negative coordinates too).  The world is bounded and does not wrap.

use std::collections::HashMap;

use dtn_core::{Coord, InterfaceId};

/// Cell address: `(floor(x / side), floor(y / side))`.
type Cell = (i32, i32);

#[inline]
fn cell_at(size: f64, loc: Coord) -> Cell {
    ((loc.x / size).floor() as i32, (loc.y / size).floor() as i32)
}

// ── ConnectivityGrid ──────────────────────────────────────────────────────────

/// One kind's spatial index: cell → members plus member → location.
pub struct ConnectivityGrid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<InterfaceId>>,
    members: HashMap<InterfaceId, Coord>,
}

impl ConnectivityGrid {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Side length of the (square) cells.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, loc: Coord) -> Cell {
        cell_at(self.cell_size, loc)
    }

    /// Register `iface` at `loc`.
    pub fn add_interface(&mut self, iface: InterfaceId, loc: Coord) {
        let cell = self.cell_of(loc);
        self.members.insert(iface, loc);
        self.cells.entry(cell).or_default().push(iface);
    }

    /// Remove `iface` from the index.
    pub fn remove_interface(&mut self, iface: InterfaceId) {
        if let Some(loc) = self.members.remove(&iface) {
            let cell = self.cell_of(loc);
            self.remove_from_cell(cell, iface);
        }
    }

    /// Record that `iface` has moved to `loc`, relocating it between cells if
    /// the move crossed a boundary.  O(1).  No-op for unregistered interfaces.
    pub fn update_location(&mut self, iface: InterfaceId, loc: Coord) {
        let size = self.cell_size;
        let Some(slot) = self.members.get_mut(&iface) else {
            return;
        };
        let old_cell = cell_at(size, *slot);
        let new_cell = cell_at(size, loc);
        *slot = loc;
        if old_cell != new_cell {
            self.remove_from_cell(old_cell, iface);
            self.cells.entry(new_cell).or_default().push(iface);
        }
    }

    /// All interfaces in `iface`'s cell and its 8 neighbours, the queried
    /// interface included.  Empty if `iface` is not registered.
    pub fn near_interfaces(&self, iface: InterfaceId) -> Vec<InterfaceId> {
        let Some(&loc) = self.members.get(&iface) else {
            return Vec::new();
        };
        let (cx, cy) = self.cell_of(loc);
        let mut near = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell) = self.cells.get(&(cx + dx, cy + dy)) {
                    near.extend_from_slice(cell);
                }
            }
        }
        near
    }

    /// Grow the cell side to `new_size` and re-bucket every member.
    fn grow(&mut self, new_size: f64) {
        self.cell_size = new_size;
        self.cells.clear();
        // members is disjoint from cells; rebuild from the location map
        let members: Vec<(InterfaceId, Coord)> =
            self.members.iter().map(|(&i, &loc)| (i, loc)).collect();
        for (iface, loc) in members {
            let cell = self.cell_of(loc);
            self.cells.entry(cell).or_default().push(iface);
        }
    }

    fn remove_from_cell(&mut self, cell: Cell, iface: InterfaceId) {
        if let Some(list) = self.cells.get_mut(&cell) {
            list.retain(|&i| i != iface);
            if list.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

// ── GridRegistry ──────────────────────────────────────────────────────────────

/// One grid per interface kind.
///
/// All interfaces sharing a kind share a grid, and the grid's cell side is the
/// maximum transmit range ever registered for that kind.  Registering a larger
/// range later grows the cell side and re-buckets the existing members, which
/// only happens during world construction in practice.
#[derive(Default)]
pub struct GridRegistry {
    grids: HashMap<String, ConnectivityGrid>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a grid exists for `kind` with cell side ≥ `range`, and
    /// return it.
    pub fn register(&mut self, kind: &str, range: f64) -> &mut ConnectivityGrid {
        let grid = self
            .grids
            .entry(kind.to_owned())
            .or_insert_with(|| ConnectivityGrid::new(range));
        if range > grid.cell_size {
            grid.grow(range);
        }
        grid
    }

    pub fn grid(&self, kind: &str) -> Option<&ConnectivityGrid> {
        self.grids.get(kind)
    }

    pub fn grid_mut(&mut self, kind: &str) -> Option<&mut ConnectivityGrid> {
        self.grids.get_mut(kind)
    }
}
