//! Value structs handed across the presentation boundary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Cell, RuleVariant};
use crate::ids::SimulationId;

/// Default number of grid rows.
pub const DEFAULT_ROWS: usize = 80;

/// Default number of grid columns.
pub const DEFAULT_COLS: usize = 120;

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Fixed size of a toroidal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridDimensions {
    /// Number of rows (height).
    pub rows: usize,
    /// Number of columns (width).
    pub cols: usize,
}

impl GridDimensions {
    /// Build dimensions from explicit sizes.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells, or `None` if it does not fit in `usize`.
    pub const fn cell_count(self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Row-major index of `(row, col)`, or `None` when out of bounds.
    pub const fn index(self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        match row.checked_mul(self.cols) {
            Some(base) => base.checked_add(col),
            None => None,
        }
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Live-cell counts per color.
///
/// Invariant maintained by the grid: `color_a + color_b` equals the number
/// of non-dead cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Population {
    /// Cells in the first color (all live cells under the monochrome rule).
    pub color_a: u32,
    /// Cells in the second color.
    pub color_b: u32,
}

impl Population {
    /// All live cells.
    pub const fn total(self) -> u32 {
        self.color_a.saturating_add(self.color_b)
    }

    /// Count for one cell state. Dead cells are not tracked and report 0.
    pub const fn count(self, cell: Cell) -> u32 {
        match cell {
            Cell::Dead => 0,
            Cell::ColorA => self.color_a,
            Cell::ColorB => self.color_b,
        }
    }

    /// Add one cell of the given state (no-op for `Dead`).
    pub const fn record(&mut self, cell: Cell) {
        match cell {
            Cell::Dead => {}
            Cell::ColorA => self.color_a = self.color_a.saturating_add(1),
            Cell::ColorB => self.color_b = self.color_b.saturating_add(1),
        }
    }

    /// Remove one cell of the given state (no-op for `Dead`).
    pub const fn forget(&mut self, cell: Cell) {
        match cell {
            Cell::Dead => {}
            Cell::ColorA => self.color_a = self.color_a.saturating_sub(1),
            Cell::ColorB => self.color_b = self.color_b.saturating_sub(1),
        }
    }

    /// Share of the first color among live cells, in `[0, 1]`.
    ///
    /// An empty grid reports `0.0` rather than NaN.
    pub fn ratio_a(self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.color_a) / f64::from(total)
    }

    /// Share of the first color as a percentage with one decimal place.
    pub fn percent_a(self) -> f64 {
        (self.ratio_a() * 1000.0).round() / 10.0
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only copy of a grid for rendering or serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridSnapshot {
    /// Simulation this snapshot was taken from.
    pub id: SimulationId,
    /// Grid size.
    pub dimensions: GridDimensions,
    /// Rule the grid runs.
    pub variant: RuleVariant,
    /// Generation counter at the time of the snapshot.
    pub generation: u64,
    /// Live-cell counts.
    pub population: Population,
    /// Row-major cell bytes (`0`, `1` or `2`).
    pub cells: Vec<u8>,
}

impl GridSnapshot {
    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        let idx = self.dimensions.index(row, col)?;
        self.cells
            .get(idx)
            .and_then(|&byte| Cell::try_from(byte).ok())
    }

    /// Iterate over rows as byte slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.dimensions.cols.max(1))
    }
}
