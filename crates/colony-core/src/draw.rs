//! Pointer-driven cell editing.
//!
//! A stroke starts on pointer press, continues across every cell the pointer
//! moves over, and ends on release. The value a stroke paints is chosen
//! once, when it starts, from the pressed cell and the button:
//!
//! - pressed cell alive: the stroke erases
//! - primary button: first color
//! - secondary button: second color (first color under the monochrome rule)
//!
//! [`DrawTool`] does not know whether editing is currently allowed; the
//! clock checks that before forwarding pointer events.

use colony_types::{Cell, PointerButton, RuleVariant};

use crate::grid::{GridError, GridState};

/// The value painted for a stroke starting on `pressed` with `button`.
pub const fn stroke_value(variant: RuleVariant, pressed: Cell, button: PointerButton) -> Cell {
    if pressed.is_alive() {
        return Cell::Dead;
    }
    match (variant, button) {
        (RuleVariant::TwoColor, PointerButton::Secondary) => Cell::ColorB,
        (RuleVariant::Monochrome, _) | (RuleVariant::TwoColor, PointerButton::Primary) => {
            Cell::ColorA
        }
    }
}

/// Active drawing stroke, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawTool {
    active: Option<Cell>,
}

impl DrawTool {
    /// A tool with no stroke in progress.
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// The value the current stroke paints.
    pub const fn active(&self) -> Option<Cell> {
        self.active
    }

    /// Whether a stroke is in progress.
    pub const fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Start a stroke at `(row, col)` and paint that cell.
    ///
    /// Returns the stroke value. A stroke already in progress is replaced.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::OutOfBounds`] from the grid; no stroke is
    /// started in that case.
    pub fn begin(
        &mut self,
        grid: &mut GridState,
        row: usize,
        col: usize,
        button: PointerButton,
    ) -> Result<Cell, GridError> {
        let pressed = grid.get_cell(row, col)?;
        let value = stroke_value(grid.variant(), pressed, button);
        grid.set_cell(row, col, value)?;
        self.active = Some(value);
        Ok(value)
    }

    /// Paint `(row, col)` with the active stroke value.
    ///
    /// Returns `None` without touching the grid when no stroke is active.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::OutOfBounds`] from the grid.
    pub fn paint(
        &self,
        grid: &mut GridState,
        row: usize,
        col: usize,
    ) -> Result<Option<Cell>, GridError> {
        let Some(value) = self.active else {
            return Ok(None);
        };
        grid.set_cell(row, col, value)?;
        Ok(Some(value))
    }

    /// Finish the stroke, wherever the pointer was released.
    pub const fn end(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::GridDimensions;

    use super::*;

    fn grid(variant: RuleVariant) -> GridState {
        GridState::with_dimensions(GridDimensions::new(6, 6), variant, Some(0)).unwrap()
    }

    #[test]
    fn stroke_value_table() {
        use PointerButton::{Primary, Secondary};
        let two = RuleVariant::TwoColor;
        let mono = RuleVariant::Monochrome;
        assert_eq!(stroke_value(two, Cell::Dead, Primary), Cell::ColorA);
        assert_eq!(stroke_value(two, Cell::Dead, Secondary), Cell::ColorB);
        assert_eq!(stroke_value(two, Cell::ColorB, Primary), Cell::Dead);
        assert_eq!(stroke_value(two, Cell::ColorA, Secondary), Cell::Dead);
        assert_eq!(stroke_value(mono, Cell::Dead, Secondary), Cell::ColorA);
        assert_eq!(stroke_value(mono, Cell::ColorA, Primary), Cell::Dead);
    }

    #[test]
    fn stroke_keeps_its_value_across_cells() {
        let mut grid = grid(RuleVariant::TwoColor);
        grid.set_cell(0, 2, Cell::ColorA).unwrap();

        let mut tool = DrawTool::new();
        let value = tool.begin(&mut grid, 0, 0, PointerButton::Secondary).unwrap();
        assert_eq!(value, Cell::ColorB);
        assert_eq!(tool.active(), Some(Cell::ColorB));

        // Moving over an already-alive cell still paints, it does not erase.
        for col in 1..=3 {
            assert_eq!(tool.paint(&mut grid, 0, col).unwrap(), Some(Cell::ColorB));
        }
        assert_eq!(grid.population().color_b, 4);
        assert_eq!(grid.population().color_a, 0);
        assert_eq!(grid.population(), grid.recount());
    }

    #[test]
    fn pressing_a_live_cell_starts_an_eraser() {
        let mut grid = grid(RuleVariant::TwoColor);
        grid.set_cell(2, 2, Cell::ColorA).unwrap();
        grid.set_cell(2, 3, Cell::ColorB).unwrap();

        let mut tool = DrawTool::new();
        assert_eq!(
            tool.begin(&mut grid, 2, 2, PointerButton::Primary).unwrap(),
            Cell::Dead
        );
        let _ = tool.paint(&mut grid, 2, 3).unwrap();
        assert_eq!(grid.population().total(), 0);
    }

    #[test]
    fn paint_without_stroke_is_noop() {
        let mut grid = grid(RuleVariant::Monochrome);
        let mut tool = DrawTool::new();
        assert_eq!(tool.paint(&mut grid, 1, 1).unwrap(), None);

        let _ = tool.begin(&mut grid, 1, 1, PointerButton::Primary).unwrap();
        tool.end();
        assert!(!tool.is_drawing());
        assert_eq!(tool.active(), None);
        assert_eq!(tool.paint(&mut grid, 1, 2).unwrap(), None);
        assert_eq!(grid.population().total(), 1);
    }

    #[test]
    fn out_of_bounds_press_starts_nothing() {
        let mut grid = grid(RuleVariant::TwoColor);
        let mut tool = DrawTool::new();
        assert!(tool.begin(&mut grid, 6, 0, PointerButton::Primary).is_err());
        assert!(!tool.is_drawing());
    }
}
