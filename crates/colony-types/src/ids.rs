//! Type-safe identifier for a simulation instance.
//!
//! Several independent simulations can live in one process (tests do this
//! routinely). Each grid is stamped with a [`SimulationId`] so log lines and
//! snapshots can be attributed to the right one.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for one simulation (grid plus counters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationId(pub Uuid);

impl SimulationId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SimulationId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SimulationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SimulationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
