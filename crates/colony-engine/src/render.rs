//! Grid callback that draws frames to a terminal.
//!
//! Each frame is a header with the counters, a share bar for the two-color
//! rule, and one text line per grid row. With `display.json_frames` set the
//! frame is a single [`GridSnapshot`](colony_types::GridSnapshot) JSON line
//! instead, for piping into other tools.

use std::io::{self, Write};

use colony_core::callback::{GridCallback, GridChange};
use colony_core::config::DisplayConfig;
use colony_core::grid::GridState;
use colony_types::{Cell, Population, RuleVariant};
use tracing::{debug, info, warn};

/// Width of the color share bar, in characters.
const SHARE_BAR_WIDTH: u64 = 40;

/// Character for one cell.
pub const fn glyph(variant: RuleVariant, cell: Cell) -> char {
    match (variant, cell) {
        (_, Cell::Dead) => '.',
        (RuleVariant::Monochrome, _) => '#',
        (RuleVariant::TwoColor, Cell::ColorA) => 'o',
        (RuleVariant::TwoColor, Cell::ColorB) => 'x',
    }
}

/// Bar showing the first color's share of the live cells.
///
/// An empty grid draws an empty bar.
pub fn share_bar(population: Population) -> String {
    let filled = u64::from(population.color_a)
        .saturating_mul(SHARE_BAR_WIDTH)
        .checked_div(u64::from(population.total()))
        .unwrap_or(0);
    let filled = usize::try_from(filled).unwrap_or(0);
    let width = usize::try_from(SHARE_BAR_WIDTH).unwrap_or(0);
    format!(
        "[{}{}]",
        "o".repeat(filled),
        "x".repeat(width.saturating_sub(filled))
    )
}

/// Counter line for one grid.
pub fn header(grid: &GridState) -> String {
    let population = grid.population();
    match grid.variant() {
        RuleVariant::Monochrome => format!(
            "generation {} | alive {}",
            grid.generation(),
            population.total()
        ),
        RuleVariant::TwoColor => format!(
            "generation {} | o {} | x {} | o share {:.1}% {}",
            grid.generation(),
            population.color_a,
            population.color_b,
            population.percent_a(),
            share_bar(population)
        ),
    }
}

/// A full text frame: header, then one line per row.
pub fn render_frame(grid: &GridState) -> String {
    let variant = grid.variant();
    let mut frame = header(grid);
    frame.push('\n');
    for row in grid.rows() {
        frame.extend(row.iter().map(|&cell| glyph(variant, cell)));
        frame.push('\n');
    }
    frame
}

/// Draws grid changes to a writer.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    display: DisplayConfig,
    frames: u64,
}

impl TerminalRenderer<io::Stdout> {
    /// A renderer writing to standard output.
    pub fn stdout(display: &DisplayConfig) -> Self {
        Self::new(io::stdout(), display)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// A renderer writing to `out`.
    pub fn new(out: W, display: &DisplayConfig) -> Self {
        Self {
            out,
            display: display.clone(),
            frames: 0,
        }
    }

    /// Frames drawn so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Give back the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn should_draw(&self, change: GridChange, grid: &GridState) -> bool {
        if !self.display.show_frames {
            return false;
        }
        match change {
            GridChange::Advanced => grid
                .generation()
                .checked_rem(self.display.render_every)
                .is_some_and(|r| r == 0),
            GridChange::Seeded | GridChange::Edited { .. } => true,
        }
    }

    fn draw(&mut self, grid: &GridState) -> io::Result<()> {
        if self.display.json_frames {
            serde_json::to_writer(&mut self.out, &grid.snapshot())?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", render_frame(grid))?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> GridCallback for TerminalRenderer<W> {
    fn on_grid_changed(&mut self, change: GridChange, grid: &GridState) {
        let population = grid.population();
        match change {
            GridChange::Seeded => info!(
                generation = grid.generation(),
                color_a = population.color_a,
                color_b = population.color_b,
                "Grid reseeded"
            ),
            GridChange::Advanced => debug!(
                generation = grid.generation(),
                color_a = population.color_a,
                color_b = population.color_b,
                percent_a = population.percent_a(),
                "Generation"
            ),
            GridChange::Edited { row, col } => debug!(row, col, "Cell edited"),
        }

        if !self.should_draw(change, grid) {
            return;
        }
        match self.draw(grid) {
            Ok(()) => self.frames = self.frames.saturating_add(1),
            Err(err) => warn!(error = %err, "Failed to draw frame"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{GridDimensions, GridSnapshot};

    use super::*;

    fn grid(variant: RuleVariant) -> GridState {
        GridState::with_dimensions(GridDimensions::new(2, 3), variant, Some(1)).unwrap()
    }

    fn display(render_every: u64, json_frames: bool) -> DisplayConfig {
        DisplayConfig {
            render_every,
            show_frames: true,
            json_frames,
        }
    }

    #[test]
    fn frame_draws_each_row() {
        let mut grid = grid(RuleVariant::TwoColor);
        grid.set_cell(0, 1, Cell::ColorA).unwrap();
        grid.set_cell(1, 2, Cell::ColorB).unwrap();
        let frame = render_frame(&grid);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.first().unwrap().contains("o share 50.0%"));
        assert_eq!(lines.get(1), Some(&".o."));
        assert_eq!(lines.get(2), Some(&"..x"));
    }

    #[test]
    fn monochrome_header_has_no_share() {
        let mut grid = grid(RuleVariant::Monochrome);
        grid.set_cell(0, 0, Cell::ColorA).unwrap();
        assert_eq!(header(&grid), "generation 0 | alive 1");
        assert!(render_frame(&grid).contains("#.."));
    }

    #[test]
    fn share_bar_handles_empty_grid() {
        let bar = share_bar(Population::default());
        assert_eq!(bar.len(), 42);
        assert!(!bar.contains('o'));

        let bar = share_bar(Population {
            color_a: 3,
            color_b: 1,
        });
        assert_eq!(bar.matches('o').count(), 30);
    }

    #[test]
    fn render_every_skips_generations() {
        let mut grid = grid(RuleVariant::TwoColor);
        let mut renderer = TerminalRenderer::new(Vec::new(), &display(2, false));
        for _ in 0..4 {
            grid.advance().unwrap();
            renderer.on_grid_changed(GridChange::Advanced, &grid);
        }
        assert_eq!(renderer.frames(), 2);

        renderer.on_grid_changed(GridChange::Edited { row: 0, col: 0 }, &grid);
        assert_eq!(renderer.frames(), 3);
    }

    #[test]
    fn hidden_frames_draw_nothing() {
        let grid = grid(RuleVariant::TwoColor);
        let mut config = display(1, false);
        config.show_frames = false;
        let mut renderer = TerminalRenderer::new(Vec::new(), &config);
        renderer.on_grid_changed(GridChange::Seeded, &grid);
        assert_eq!(renderer.frames(), 0);
        assert!(renderer.into_inner().is_empty());
    }

    #[test]
    fn json_frames_are_snapshots() {
        let mut grid = grid(RuleVariant::TwoColor);
        grid.set_cell(1, 1, Cell::ColorB).unwrap();
        let mut renderer = TerminalRenderer::new(Vec::new(), &display(1, true));
        renderer.on_grid_changed(GridChange::Seeded, &grid);

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let snapshot: GridSnapshot = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(snapshot, grid.snapshot());
    }
}
