//! Shared type definitions for the Colony simulation.
//!
//! These are the values that cross the boundary between the simulation core
//! and whatever presents it. They flow downstream to `TypeScript` via
//! `ts-rs` so browser glue can consume snapshots directly.
//!
//! # Modules
//!
//! - [`ids`] -- [`SimulationId`], one per independent simulation
//! - [`enums`] -- cell states, rule variants, pointer buttons, clock state
//! - [`structs`] -- dimensions, population counters, grid snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Cell, ClockState, InvalidCellValue, PointerButton, RuleVariant, Speed};
pub use ids::SimulationId;
pub use structs::{DEFAULT_COLS, DEFAULT_ROWS, GridDimensions, GridSnapshot, Population};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // ts-rs writes one `.ts` file per type into `bindings/` relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::ids::SimulationId::export_all();

        let _ = crate::enums::Cell::export_all();
        let _ = crate::enums::RuleVariant::export_all();
        let _ = crate::enums::PointerButton::export_all();
        let _ = crate::enums::ClockState::export_all();
        let _ = crate::enums::Speed::export_all();

        let _ = crate::structs::GridDimensions::export_all();
        let _ = crate::structs::Population::export_all();
        let _ = crate::structs::GridSnapshot::export_all();
    }
}
