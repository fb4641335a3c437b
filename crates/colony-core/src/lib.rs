//! Simulation core for Colony: a toroidal Game of Life with an optional
//! second competing color.
//!
//! The grid and its counters live in [`GridState`]; the only way to mutate
//! them while a run is in progress is through a [`SimulationClock`], which
//! enforces that edits happen only while the clock is stopped.
//!
//! # Modules
//!
//! - [`rule`] -- Neighbor census and the B3/S23 transition, with majority
//!   coloring for the two-color rule.
//! - [`grid`] -- [`GridState`]: cells, population counters, seeding, and the
//!   double-buffered generation advance.
//! - [`draw`] -- [`DrawTool`]: pointer strokes that paint or erase cells.
//! - [`timer`] -- [`TickTimer`] with manual and tokio-backed implementations.
//! - [`clock`] -- [`SimulationClock`]: Stopped/Running, speed, editing gate.
//! - [`callback`] -- [`GridCallback`], the presentation boundary.
//! - [`runner`] -- [`run_simulation`], the async command loop.
//! - [`config`] -- Configuration loading from `colony-config.yaml`.
//!
//! [`GridState`]: grid::GridState
//! [`DrawTool`]: draw::DrawTool
//! [`TickTimer`]: timer::TickTimer
//! [`SimulationClock`]: clock::SimulationClock
//! [`GridCallback`]: callback::GridCallback
//! [`run_simulation`]: runner::run_simulation

pub mod callback;
pub mod clock;
pub mod config;
pub mod draw;
pub mod grid;
pub mod rule;
pub mod runner;
pub mod timer;
