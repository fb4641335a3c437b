//! The toroidal cell grid and its population bookkeeping.
//!
//! [`GridState`] exclusively owns the current generation's cells, the
//! per-color population counters, and the generation counter. Nothing else
//! mutates them.
//!
//! # Invariants
//!
//! - `population.total()` always equals the number of non-dead cells.
//!   Seeding and advancing recount from scratch; single-cell writes apply
//!   the exact delta.
//! - Advancing never reads a half-updated grid: next states are written to
//!   a scratch buffer that is swapped in only after every cell is computed.
//! - Every cell holds a state the [`RuleVariant`] admits.

use colony_types::{
    Cell, DEFAULT_COLS, DEFAULT_ROWS, GridDimensions, GridSnapshot, Population, RuleVariant,
    SimulationId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::rule::{self, Neighborhood};

/// Number of cells in a default-sized grid.
const DEFAULT_CELL_COUNT: usize = DEFAULT_ROWS * DEFAULT_COLS;

/// Errors that can occur during grid operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A coordinate lies outside the grid.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid height.
        rows: usize,
        /// Grid width.
        cols: usize,
    },

    /// The cell state is not used by the grid's rule variant.
    #[error("cell state {cell:?} is not valid under the {variant:?} rule")]
    CellNotInVariant {
        /// The rejected state.
        cell: Cell,
        /// The grid's rule.
        variant: RuleVariant,
    },

    /// Seeding density outside `[0, 1]` (or NaN).
    #[error("density must be within [0, 1], got {density}")]
    InvalidDensity {
        /// The rejected density.
        density: f64,
    },

    /// Grid dimensions are zero or too large to allocate.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Requested height.
        rows: usize,
        /// Requested width.
        cols: usize,
    },

    /// The generation counter would overflow.
    #[error("generation counter overflow: cannot advance beyond u64::MAX")]
    GenerationOverflow,
}

impl GridError {
    /// Whether the error comes from a bad request rather than from the
    /// grid's own state. Such requests can be dropped and the run continued.
    pub const fn is_rejected_input(&self) -> bool {
        !matches!(self, Self::GenerationOverflow)
    }
}

/// The current generation of a toroidal grid plus its counters.
#[derive(Debug, Clone)]
pub struct GridState {
    /// Identity of this simulation.
    id: SimulationId,
    /// Fixed grid size.
    dimensions: GridDimensions,
    /// Rule the grid runs.
    variant: RuleVariant,
    /// Live cells, row-major.
    cells: Vec<Cell>,
    /// Write buffer for the next generation. Same length as `cells`.
    scratch: Vec<Cell>,
    /// Generations computed since the last seed.
    generation: u64,
    /// Live-cell counts, kept exact.
    population: Population,
    /// Source of randomness for seeding.
    rng: StdRng,
    /// Seed `rng` was created from, for replaying a run.
    rng_seed: u64,
}

impl GridState {
    /// Create an all-dead grid of the default 80x120 size.
    ///
    /// When `rng_seed` is `None` a seed is drawn from the thread RNG; it is
    /// available afterwards through [`rng_seed`](Self::rng_seed).
    pub fn new(variant: RuleVariant, rng_seed: Option<u64>) -> Self {
        Self::build(
            GridDimensions::default(),
            DEFAULT_CELL_COUNT,
            variant,
            rng_seed,
        )
    }

    /// Create an all-dead grid with explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either side is zero or
    /// the cell count overflows.
    pub fn with_dimensions(
        dimensions: GridDimensions,
        variant: RuleVariant,
        rng_seed: Option<u64>,
    ) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimensions {
            rows: dimensions.rows,
            cols: dimensions.cols,
        };
        if dimensions.rows == 0 || dimensions.cols == 0 {
            return Err(invalid);
        }
        let count = dimensions.cell_count().ok_or(invalid)?;
        Ok(Self::build(dimensions, count, variant, rng_seed))
    }

    fn build(
        dimensions: GridDimensions,
        count: usize,
        variant: RuleVariant,
        rng_seed: Option<u64>,
    ) -> Self {
        let rng_seed = rng_seed.unwrap_or_else(rand::random);
        let id = SimulationId::new();
        debug!(
            simulation = %id,
            rows = dimensions.rows,
            cols = dimensions.cols,
            variant = ?variant,
            rng_seed,
            "Grid created"
        );
        Self {
            id,
            dimensions,
            variant,
            cells: vec![Cell::Dead; count],
            scratch: vec![Cell::Dead; count],
            generation: 0,
            population: Population::default(),
            rng: StdRng::seed_from_u64(rng_seed),
            rng_seed,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identity of this simulation.
    pub const fn id(&self) -> SimulationId {
        self.id
    }

    /// Grid size.
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Rule the grid runs.
    pub const fn variant(&self) -> RuleVariant {
        self.variant
    }

    /// Generations computed since the last seed.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Live-cell counts.
    pub const fn population(&self) -> Population {
        self.population
    }

    /// Seed of the internal RNG.
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.dimensions.cols)
    }

    /// Current state of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn get_cell(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        self.dimensions
            .index(row, col)
            .and_then(|idx| self.cells.get(idx))
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Census of the eight toroidal neighbors of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn neighborhood(&self, row: usize, col: usize) -> Result<Neighborhood, GridError> {
        if self.dimensions.index(row, col).is_none() {
            return Err(self.out_of_bounds(row, col));
        }
        Ok(census(&self.cells, self.dimensions, row, col))
    }

    /// Read-only copy for rendering or serialization.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            id: self.id,
            dimensions: self.dimensions,
            variant: self.variant,
            generation: self.generation,
            population: self.population,
            cells: self.cells.iter().map(|cell| cell.as_u8()).collect(),
        }
    }

    /// Count live cells from scratch, ignoring the cached counters.
    pub fn recount(&self) -> Population {
        let mut population = Population::default();
        for &cell in &self.cells {
            population.record(cell);
        }
        population
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Refill every cell independently at random.
    ///
    /// Each cell draws a uniform value `v` in `[0, 1)`. Monochrome: alive iff
    /// `v < density`. Two-color: first color iff `v < density / 2`, second
    /// color iff `density / 2 <= v < density`, else dead. Resets the
    /// generation to 0 and recounts the population exactly.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDensity`] for NaN or values outside `[0, 1]`.
    pub fn seed(&mut self, density: f64) -> Result<(), GridError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(GridError::InvalidDensity { density });
        }
        let half = density / 2.0;
        for cell in &mut self.cells {
            let roll: f64 = self.rng.random();
            *cell = match self.variant {
                RuleVariant::Monochrome if roll < density => Cell::ColorA,
                RuleVariant::TwoColor if roll < half => Cell::ColorA,
                RuleVariant::TwoColor if roll < density => Cell::ColorB,
                RuleVariant::Monochrome | RuleVariant::TwoColor => Cell::Dead,
            };
        }
        self.generation = 0;
        self.population = self.recount();
        debug!(
            simulation = %self.id,
            density,
            color_a = self.population.color_a,
            color_b = self.population.color_b,
            "Grid seeded"
        );
        Ok(())
    }

    /// Kill every cell and reset the counters. Same as `seed(0.0)`.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
        self.generation = 0;
        self.population = Population::default();
        debug!(simulation = %self.id, "Grid cleared");
    }

    /// Compute the next generation and swap it in.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::GenerationOverflow`] if the counter is at
    /// `u64::MAX`; the grid is left untouched in that case.
    pub fn advance(&mut self) -> Result<u64, GridError> {
        let next_generation = self
            .generation
            .checked_add(1)
            .ok_or(GridError::GenerationOverflow)?;

        let dims = self.dimensions;
        let mut population = Population::default();
        for (row, out_row) in self.scratch.chunks_mut(dims.cols).enumerate() {
            for (col, out) in out_row.iter_mut().enumerate() {
                let current = cell_at(&self.cells, dims, row, col);
                let next = rule::next_state(
                    self.variant,
                    current,
                    census(&self.cells, dims, row, col),
                );
                population.record(next);
                *out = next;
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);

        self.generation = next_generation;
        self.population = population;
        Ok(next_generation)
    }

    /// Write one cell and adjust the counters by the implied delta.
    ///
    /// Returns the previous state. Whether editing is currently allowed is
    /// the clock's concern, not the grid's.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid,
    /// or [`GridError::CellNotInVariant`] for a state the rule does not use.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<Cell, GridError> {
        if !self.variant.admits(cell) {
            return Err(GridError::CellNotInVariant {
                cell,
                variant: self.variant,
            });
        }
        let oob = self.out_of_bounds(row, col);
        let slot = self
            .dimensions
            .index(row, col)
            .and_then(|idx| self.cells.get_mut(idx))
            .ok_or(oob)?;
        let previous = std::mem::replace(slot, cell);
        self.population.forget(previous);
        self.population.record(cell);
        Ok(previous)
    }

    const fn out_of_bounds(&self, row: usize, col: usize) -> GridError {
        GridError::OutOfBounds {
            row,
            col,
            rows: self.dimensions.rows,
            cols: self.dimensions.cols,
        }
    }
}

/// Cell at an in-bounds coordinate; dead if somehow out of range.
fn cell_at(cells: &[Cell], dims: GridDimensions, row: usize, col: usize) -> Cell {
    dims.index(row, col)
        .and_then(|idx| cells.get(idx))
        .copied()
        .unwrap_or_default()
}

/// Previous index on a ring of length `len`.
const fn wrap_back(i: usize, len: usize) -> usize {
    match i.checked_sub(1) {
        Some(prev) => prev,
        None => len.saturating_sub(1),
    }
}

/// Next index on a ring of length `len`.
const fn wrap_forward(i: usize, len: usize) -> usize {
    let next = i.saturating_add(1);
    if next >= len { 0 } else { next }
}

/// Census of the eight neighbors of `(row, col)`, wrapping at every edge.
fn census(cells: &[Cell], dims: GridDimensions, row: usize, col: usize) -> Neighborhood {
    let up = wrap_back(row, dims.rows);
    let down = wrap_forward(row, dims.rows);
    let left = wrap_back(col, dims.cols);
    let right = wrap_forward(col, dims.cols);
    [
        (up, left),
        (up, col),
        (up, right),
        (row, left),
        (row, right),
        (down, left),
        (down, col),
        (down, right),
    ]
    .into_iter()
    .map(|(r, c)| cell_at(cells, dims, r, c))
    .collect()
}
