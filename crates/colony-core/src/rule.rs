//! The B3/S23 transition rule and its two-color generalization.
//!
//! A cell's next state depends only on its current state and the census of
//! its eight toroidal neighbors:
//!
//! | live neighbors | next state |
//! |----------------|------------|
//! | 2              | unchanged (color included) |
//! | 3              | alive; two-color picks the neighbor majority |
//! | anything else  | dead |
//!
//! Under the two-color rule the majority vote applies whenever there are
//! exactly three live neighbors, including when the cell is already alive.
//! An alive cell can therefore switch colors while "surviving". Ties cannot
//! happen with three voters; a single first-color neighbor loses.

use colony_types::{Cell, RuleVariant};

/// Census of the eight cells surrounding one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighborhood {
    /// Neighbors that are alive in any color.
    pub alive: u8,
    /// Neighbors in the first color.
    pub color_a: u8,
}

impl Neighborhood {
    /// Count one neighbor.
    pub const fn add(&mut self, neighbor: Cell) {
        match neighbor {
            Cell::Dead => {}
            Cell::ColorA => {
                self.alive = self.alive.saturating_add(1);
                self.color_a = self.color_a.saturating_add(1);
            }
            Cell::ColorB => self.alive = self.alive.saturating_add(1),
        }
    }

    /// Neighbors in the second color.
    pub const fn color_b(self) -> u8 {
        self.alive.saturating_sub(self.color_a)
    }
}

impl FromIterator<Cell> for Neighborhood {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let mut census = Self::default();
        for cell in iter {
            census.add(cell);
        }
        census
    }
}

/// Compute a cell's next state.
pub const fn next_state(variant: RuleVariant, current: Cell, census: Neighborhood) -> Cell {
    match census.alive {
        2 => current,
        3 => match variant {
            RuleVariant::Monochrome => Cell::ColorA,
            RuleVariant::TwoColor => {
                if census.color_a > 1 {
                    Cell::ColorA
                } else {
                    Cell::ColorB
                }
            }
        },
        _ => Cell::Dead,
    }
}
