//! The presentation boundary.
//!
//! The core never renders anything. After every mutation that a viewer
//! should see it calls [`GridCallback::on_grid_changed`] with what happened
//! and a read-only borrow of the grid; the implementor redraws cells and
//! counters however it likes.

use crate::grid::GridState;

/// What changed in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridChange {
    /// The whole grid was refilled (randomize or clear).
    Seeded,
    /// One generation was computed.
    Advanced,
    /// A single cell was written by the editing tool.
    Edited {
        /// Row of the edited cell.
        row: usize,
        /// Column of the edited cell.
        col: usize,
    },
}

/// Receives a notification after each visible grid change.
///
/// Policy rejections (an edit while running, say) produce no notification.
pub trait GridCallback: Send {
    /// Called once per seed, advance, or single-cell edit.
    fn on_grid_changed(&mut self, change: GridChange, grid: &GridState);
}

/// A callback that ignores every notification.
pub struct NoOpCallback;

impl GridCallback for NoOpCallback {
    fn on_grid_changed(&mut self, _change: GridChange, _grid: &GridState) {}
}

/// Records every notification, for tests.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    /// Changes in the order they were reported.
    pub changes: Vec<GridChange>,
}

impl RecordingCallback {
    /// Number of [`GridChange::Advanced`] notifications seen.
    pub fn advances(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, GridChange::Advanced))
            .count()
    }
}

impl GridCallback for RecordingCallback {
    fn on_grid_changed(&mut self, change: GridChange, _grid: &GridState) {
        self.changes.push(change);
    }
}
