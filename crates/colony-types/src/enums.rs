//! Enumeration types for the Colony simulation.
//!
//! Cell states, rule variants, and the small state enums that the
//! presentation glue reads to decide what to show and what to allow.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// The state of one grid cell.
///
/// The numeric values are stable and are what snapshots carry:
/// `0 = Dead`, `1 = ColorA`, `2 = ColorB`. The monochrome rule only ever
/// uses `Dead` and `ColorA`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
#[repr(u8)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Dead = 0,
    /// Alive, first colony (the only live state in the monochrome rule).
    ColorA = 1,
    /// Alive, second colony.
    ColorB = 2,
}

impl Cell {
    /// Whether the cell is alive, whatever its color.
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Dead)
    }

    /// Stable numeric encoding used in snapshots.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A byte that does not encode any [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell value: {0} (expected 0, 1 or 2)")]
pub struct InvalidCellValue(pub u8);

impl TryFrom<u8> for Cell {
    type Error = InvalidCellValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Dead),
            1 => Ok(Self::ColorA),
            2 => Ok(Self::ColorB),
            other => Err(InvalidCellValue(other)),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell.as_u8()
    }
}

// ---------------------------------------------------------------------------
// Rule variant
// ---------------------------------------------------------------------------

/// Which flavor of B3/S23 the grid runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RuleVariant {
    /// Classic Conway: cells are dead or alive.
    Monochrome,
    /// Two competing colors; births take the majority color of the parents.
    #[default]
    TwoColor,
}

impl RuleVariant {
    /// Whether a cell state is legal under this variant.
    pub const fn admits(self, cell: Cell) -> bool {
        match self {
            Self::Monochrome => !matches!(cell, Cell::ColorB),
            Self::TwoColor => true,
        }
    }

    /// Parse a variant name as used in config files and env overrides.
    ///
    /// Accepts `monochrome`/`classic` and `two_color`/`two-color`/`colors`,
    /// case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "monochrome" | "classic" => Some(Self::Monochrome),
            "two_color" | "two-color" | "twocolor" | "colors" => Some(Self::TwoColor),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer input
// ---------------------------------------------------------------------------

/// The pointer button that started a drawing stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PointerButton {
    /// Main button (left click); paints the first color.
    Primary,
    /// Secondary button (right click); paints the second color.
    Secondary,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Run state of the simulation clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClockState {
    /// No periodic ticks; editing, stepping and reseeding are allowed.
    #[default]
    Stopped,
    /// Ticks fire periodically; the grid only changes through ticks.
    Running,
}

/// Tick cadence selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Speed {
    /// The normal tick interval.
    #[default]
    Normal,
    /// The shorter "faster" tick interval.
    Fast,
}

impl Speed {
    /// The other speed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Fast,
            Self::Fast => Self::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_byte_encoding_is_stable() {
        assert_eq!(Cell::Dead.as_u8(), 0);
        assert_eq!(Cell::ColorA.as_u8(), 1);
        assert_eq!(Cell::ColorB.as_u8(), 2);
        assert_eq!(Cell::try_from(2), Ok(Cell::ColorB));
        assert_eq!(Cell::try_from(3), Err(InvalidCellValue(3)));
    }

    #[test]
    fn monochrome_rejects_second_color() {
        assert!(RuleVariant::Monochrome.admits(Cell::Dead));
        assert!(RuleVariant::Monochrome.admits(Cell::ColorA));
        assert!(!RuleVariant::Monochrome.admits(Cell::ColorB));
        assert!(RuleVariant::TwoColor.admits(Cell::ColorB));
    }

    #[test]
    fn variant_names_parse() {
        assert_eq!(RuleVariant::from_name("Classic"), Some(RuleVariant::Monochrome));
        assert_eq!(RuleVariant::from_name(" two-color "), Some(RuleVariant::TwoColor));
        assert_eq!(RuleVariant::from_name("hexagonal"), None);
    }

    #[test]
    fn cell_serializes_snake_case() {
        let json = serde_json::to_string(&Cell::ColorB).ok();
        assert_eq!(json.as_deref(), Some("\"color_b\""));
    }

    #[test]
    fn speed_toggles() {
        assert_eq!(Speed::Normal.toggled(), Speed::Fast);
        assert_eq!(Speed::Fast.toggled(), Speed::Normal);
    }
}
