//! The command loop that drives a clock from user controls and its timer.
//!
//! [`run_simulation`] owns the [`SimulationClock`] for the length of a run,
//! so nothing else can touch the grid while it is running. It waits on two
//! sources at once:
//!
//! - **Commands** from the presentation glue ([`ControlCommand`]), one per
//!   button press or pointer event
//! - **Timer fires** from the clock's [`IntervalTimer`], armed only while
//!   the clock is Running
//!
//! The run ends on [`ControlCommand::Shutdown`], when every command sender
//! is dropped, or when a configured bound is reached. A bounded run whose
//! clock is Running when the senders go away keeps ticking until the bound.

use std::time::Duration;

use chrono::{DateTime, Utc};
use colony_types::{Cell, PointerButton, Population};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::callback::GridCallback;
use crate::clock::{ClockError, ClockOutcome, SimulationClock};
use crate::config::BoundsConfig;
use crate::timer::IntervalTimer;

/// A user control, as delivered by presentation glue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Start or pause.
    TogglePlay,
    /// Advance one generation (Stopped only).
    Step,
    /// Refill at random with the given density (Stopped only).
    Randomize {
        /// Share of cells alive afterwards.
        density: f64,
    },
    /// Kill every cell (Stopped only).
    Clear,
    /// Select fast or normal cadence.
    SetFast {
        /// `true` for the fast interval.
        enabled: bool,
    },
    /// Flip the cadence.
    ToggleFast,
    /// Write one cell directly (Stopped only).
    SetCell {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
        /// New state.
        cell: Cell,
    },
    /// Pointer pressed on a cell (Stopped only).
    BeginStroke {
        /// Row under the pointer.
        row: usize,
        /// Column under the pointer.
        col: usize,
        /// Button that was pressed.
        button: PointerButton,
    },
    /// Pointer moved onto a cell.
    ContinueStroke {
        /// Row under the pointer.
        row: usize,
        /// Column under the pointer.
        col: usize,
    },
    /// Pointer released.
    EndStroke,
    /// End the run.
    Shutdown,
}

/// Errors that end a run abnormally.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock failed in a way that cannot be skipped.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Reason why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// A [`ControlCommand::Shutdown`] was received.
    Shutdown,
    /// Every command sender was dropped.
    CommandsClosed,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// Ticks executed during this run, timer-driven or stepped.
    pub total_ticks: u64,
    /// Generation counter when the run ended.
    pub final_generation: u64,
    /// Live-cell counts when the run ended.
    pub final_population: Population,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub ended_at: DateTime<Utc>,
}

/// What woke the loop.
enum Wake {
    Command(Option<ControlCommand>),
    Timer,
    Deadline,
}

/// Run the command loop until a termination condition is met.
///
/// # Arguments
///
/// * `clock` - The clock to drive; it stays usable after the run
/// * `commands` - User controls, in order
/// * `bounds` - Tick and wall-clock limits (0 = unlimited)
/// * `callback` - Notified after every visible grid change
///
/// # Errors
///
/// Returns [`RunnerError`] if the clock fails unrecoverably (generation
/// overflow). Rejected input such as out-of-bounds coordinates is logged
/// and skipped.
pub async fn run_simulation(
    clock: &mut SimulationClock<IntervalTimer>,
    commands: &mut mpsc::Receiver<ControlCommand>,
    bounds: &BoundsConfig,
    callback: &mut dyn GridCallback,
) -> Result<SimulationResult, RunnerError> {
    let started_at = Utc::now();
    let deadline = (bounds.max_real_time_seconds > 0).then(|| {
        let now = Instant::now();
        let limit = Duration::from_secs(bounds.max_real_time_seconds);
        now.checked_add(limit).unwrap_or(now)
    });
    let mut total_ticks: u64 = 0;
    let mut commands_open = true;

    info!(
        simulation = %clock.grid().id(),
        variant = ?clock.grid().variant(),
        max_ticks = bounds.max_ticks,
        max_real_time_seconds = bounds.max_real_time_seconds,
        "Simulation starting"
    );

    let end_reason = loop {
        let wake = tokio::select! {
            biased;
            command = commands.recv(), if commands_open => Wake::Command(command),
            () = clock.timer_mut().fired() => Wake::Timer,
            () = sleep_until(deadline) => Wake::Deadline,
        };

        let outcome = match wake {
            // A bounded run that is already ticking keeps going until a
            // bound ends it.
            Wake::Command(None) if clock.is_running() && bounds.is_bounded() => {
                info!("Command channel closed, running on to the configured bound");
                commands_open = false;
                continue;
            }
            Wake::Command(None) => {
                info!("Command channel closed");
                break SimulationEndReason::CommandsClosed;
            }
            Wake::Command(Some(ControlCommand::Shutdown)) => {
                info!("Shutdown requested");
                break SimulationEndReason::Shutdown;
            }
            Wake::Command(Some(command)) => apply_command(clock, command, callback),
            Wake::Timer => clock.on_timer(callback).map(|o| (o, true)),
            Wake::Deadline => {
                info!(
                    max_seconds = bounds.max_real_time_seconds,
                    "Real-time limit reached"
                );
                break SimulationEndReason::MaxRealTimeReached;
            }
        };

        match outcome {
            Ok((ClockOutcome::Applied, true)) => total_ticks = total_ticks.saturating_add(1),
            Ok(_) => {}
            Err(ClockError::Grid { source }) if source.is_rejected_input() => {
                warn!(error = %source, "Command rejected");
            }
            Err(err) => return Err(err.into()),
        }

        if bounds.max_ticks > 0 && total_ticks >= bounds.max_ticks {
            info!(
                generation = clock.grid().generation(),
                max_ticks = bounds.max_ticks,
                "Tick limit reached"
            );
            break SimulationEndReason::MaxTicksReached;
        }
    };

    Ok(SimulationResult {
        end_reason,
        total_ticks,
        final_generation: clock.grid().generation(),
        final_population: clock.grid().population(),
        started_at,
        ended_at: Utc::now(),
    })
}

/// Apply one command. The flag says whether it was a tick request.
fn apply_command(
    clock: &mut SimulationClock<IntervalTimer>,
    command: ControlCommand,
    callback: &mut dyn GridCallback,
) -> Result<(ClockOutcome, bool), ClockError> {
    debug!(command = ?command, "Command received");
    match command {
        ControlCommand::TogglePlay => {
            clock.toggle();
            Ok((ClockOutcome::Applied, false))
        }
        ControlCommand::Step => clock.step(callback).map(|o| (o, true)),
        ControlCommand::Randomize { density } => clock.seed(density, callback).map(|o| (o, false)),
        ControlCommand::Clear => Ok((clock.clear(callback), false)),
        ControlCommand::SetFast { enabled } => {
            clock.set_fast(enabled);
            Ok((ClockOutcome::Applied, false))
        }
        ControlCommand::ToggleFast => {
            clock.toggle_fast();
            Ok((ClockOutcome::Applied, false))
        }
        ControlCommand::SetCell { row, col, cell } => clock
            .edit_cell(row, col, cell, callback)
            .map(|o| (o, false)),
        ControlCommand::BeginStroke { row, col, button } => clock
            .begin_stroke(row, col, button, callback)
            .map(|o| (o, false)),
        ControlCommand::ContinueStroke { row, col } => clock
            .continue_stroke(row, col, callback)
            .map(|o| (o, false)),
        ControlCommand::EndStroke => {
            clock.end_stroke();
            Ok((ClockOutcome::Applied, false))
        }
        // Handled by the loop before dispatch.
        ControlCommand::Shutdown => Ok((ClockOutcome::Ignored, false)),
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    let elapsed_ms = result
        .ended_at
        .signed_duration_since(result.started_at)
        .num_milliseconds();
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_generation = result.final_generation,
        color_a = result.final_population.color_a,
        color_b = result.final_population.color_b,
        percent_a = result.final_population.percent_a(),
        elapsed_ms,
        "Simulation ended"
    );
    if result.total_ticks == 0 {
        warn!("Simulation ended with no ticks executed");
    }
}
