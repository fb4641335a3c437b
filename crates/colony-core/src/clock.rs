//! The simulation clock: run state, cadence, and the editing gate.
//!
//! [`SimulationClock`] owns the [`GridState`] and is the only path through
//! which the grid is mutated. It is in one of two states:
//!
//! - **Stopped** (initial): no periodic ticks. Stepping, reseeding, and
//!   editing are allowed.
//! - **Running**: the timer fires every tick interval and each fire
//!   advances the grid. Stepping, reseeding, and editing are ignored.
//!
//! Ignored requests are not errors. They return [`ClockOutcome::Ignored`],
//! leave the grid untouched, and send no notification.
//!
//! The clock arms and disarms a [`TickTimer`] but never waits on it; the
//! owner of the timer reports fires through [`SimulationClock::on_timer`].

use std::time::Duration;

use colony_types::{Cell, ClockState, PointerButton, Population, Speed};
use serde::Serialize;
use tracing::{debug, info};

use crate::callback::{GridCallback, GridChange};
use crate::draw::DrawTool;
use crate::grid::{GridError, GridState};
use crate::timer::{ManualTimer, TickTimer};

/// Default tick interval at normal speed.
pub const DEFAULT_NORMAL_INTERVAL: Duration = Duration::from_millis(75);

/// Default tick interval at fast speed.
pub const DEFAULT_FAST_INTERVAL: Duration = Duration::from_millis(40);

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The grid rejected the operation.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// A tick interval is unusable.
    #[error("invalid tick interval: {reason}")]
    InvalidInterval {
        /// Explanation of what is wrong with the interval.
        reason: String,
    },
}

/// Whether a request changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ClockOutcome {
    /// The request was carried out.
    Applied,
    /// The request is not allowed in the current state and was dropped.
    Ignored,
}

impl ClockOutcome {
    /// Whether the request was carried out.
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Tick periods for each [`Speed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervals {
    normal: Duration,
    fast: Duration,
}

impl TickIntervals {
    /// Build intervals from explicit periods.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidInterval`] if either period is zero.
    pub fn new(normal: Duration, fast: Duration) -> Result<Self, ClockError> {
        if normal.is_zero() || fast.is_zero() {
            return Err(ClockError::InvalidInterval {
                reason: format!(
                    "tick intervals must be non-zero (normal {normal:?}, fast {fast:?})"
                ),
            });
        }
        Ok(Self { normal, fast })
    }

    /// Build intervals from millisecond values.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidInterval`] if either value is zero.
    pub fn from_millis(normal_ms: u64, fast_ms: u64) -> Result<Self, ClockError> {
        Self::new(
            Duration::from_millis(normal_ms),
            Duration::from_millis(fast_ms),
        )
    }

    /// Period for the given speed.
    pub const fn for_speed(self, speed: Speed) -> Duration {
        match speed {
            Speed::Normal => self.normal,
            Speed::Fast => self.fast,
        }
    }
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            normal: DEFAULT_NORMAL_INTERVAL,
            fast: DEFAULT_FAST_INTERVAL,
        }
    }
}

/// Serializable summary of the clock for presentation glue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockStatus {
    /// Run state.
    pub state: ClockState,
    /// Selected cadence.
    pub speed: Speed,
    /// Active tick period in milliseconds.
    pub interval_ms: u64,
    /// Whether pointer edits are accepted right now.
    pub editing_allowed: bool,
    /// Current generation.
    pub generation: u64,
    /// Live-cell counts.
    pub population: Population,
    /// Share of the first color, in percent with one decimal.
    pub percent_a: f64,
    /// Ticks executed since the clock was created.
    pub ticks: u64,
}

/// Drives a [`GridState`] through ticks and gates edits on the run state.
#[derive(Debug)]
pub struct SimulationClock<T: TickTimer> {
    grid: GridState,
    timer: T,
    state: ClockState,
    speed: Speed,
    intervals: TickIntervals,
    draw: DrawTool,
    /// Ticks executed, timer-driven or stepped.
    ticks: u64,
}

impl<T: TickTimer> SimulationClock<T> {
    /// Wrap a grid. The clock starts Stopped at normal speed with the timer
    /// disarmed.
    pub fn new(grid: GridState, mut timer: T, intervals: TickIntervals) -> Self {
        timer.stop();
        Self {
            grid,
            timer,
            state: ClockState::Stopped,
            speed: Speed::Normal,
            intervals,
            draw: DrawTool::new(),
            ticks: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The grid, read-only.
    pub const fn grid(&self) -> &GridState {
        &self.grid
    }

    /// The timer, read-only.
    pub const fn timer(&self) -> &T {
        &self.timer
    }

    /// The timer, for the driver that waits on it.
    pub const fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Current run state.
    pub const fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock is running.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running)
    }

    /// Whether manual edits, stepping, and reseeding are accepted.
    pub const fn editing_allowed(&self) -> bool {
        !self.is_running()
    }

    /// Selected cadence.
    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Configured periods.
    pub const fn intervals(&self) -> TickIntervals {
        self.intervals
    }

    /// Period for the selected speed.
    pub const fn current_interval(&self) -> Duration {
        self.intervals.for_speed(self.speed)
    }

    /// The stroke state.
    pub const fn draw_tool(&self) -> &DrawTool {
        &self.draw
    }

    /// Ticks executed since the clock was created.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshot of the clock for display.
    pub fn status(&self) -> ClockStatus {
        let population = self.grid.population();
        ClockStatus {
            state: self.state,
            speed: self.speed,
            interval_ms: u64::try_from(self.current_interval().as_millis()).unwrap_or(u64::MAX),
            editing_allowed: self.editing_allowed(),
            generation: self.grid.generation(),
            population,
            percent_a: population.percent_a(),
            ticks: self.ticks,
        }
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    /// Switch between Stopped and Running. Returns the new state.
    ///
    /// Entering Running arms the timer at the current speed and ends any
    /// stroke in progress. Entering Stopped disarms the timer.
    pub fn toggle(&mut self) -> ClockState {
        self.state = match self.state {
            ClockState::Stopped => {
                self.draw.end();
                self.timer.start(self.current_interval());
                ClockState::Running
            }
            ClockState::Running => {
                self.timer.stop();
                ClockState::Stopped
            }
        };
        info!(
            simulation = %self.grid.id(),
            state = ?self.state,
            generation = self.grid.generation(),
            "Clock toggled"
        );
        self.state
    }

    /// Select fast or normal cadence.
    ///
    /// While running the timer is restarted with the new period, dropping
    /// any partially elapsed interval.
    pub fn set_fast(&mut self, enabled: bool) {
        let speed = if enabled { Speed::Fast } else { Speed::Normal };
        self.set_speed(speed);
    }

    /// Flip between fast and normal cadence. Returns the new speed.
    pub fn toggle_fast(&mut self) -> Speed {
        self.set_speed(self.speed.toggled());
        self.speed
    }

    fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
        if self.is_running() {
            self.timer.start(self.current_interval());
        }
        debug!(
            speed = ?self.speed,
            interval_ms = u64::try_from(self.current_interval().as_millis()).unwrap_or(u64::MAX),
            running = self.is_running(),
            "Speed changed"
        );
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Handle one timer fire.
    ///
    /// A fire that arrives after the clock was stopped is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] if the generation counter overflows.
    pub fn on_timer(&mut self, callback: &mut dyn GridCallback) -> Result<ClockOutcome, ClockError> {
        if !self.is_running() {
            debug!("Stale timer fire ignored");
            return Ok(ClockOutcome::Ignored);
        }
        self.tick(callback)
    }

    /// Advance exactly one generation. Only allowed while Stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] if the generation counter overflows.
    pub fn step(&mut self, callback: &mut dyn GridCallback) -> Result<ClockOutcome, ClockError> {
        if self.is_running() {
            debug!("Step ignored while running");
            return Ok(ClockOutcome::Ignored);
        }
        self.tick(callback)
    }

    fn tick(&mut self, callback: &mut dyn GridCallback) -> Result<ClockOutcome, ClockError> {
        let generation = self.grid.advance()?;
        self.ticks = self.ticks.saturating_add(1);
        let population = self.grid.population();
        debug!(
            generation,
            color_a = population.color_a,
            color_b = population.color_b,
            "Tick"
        );
        callback.on_grid_changed(GridChange::Advanced, &self.grid);
        Ok(ClockOutcome::Applied)
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    /// Refill the grid at random. Only allowed while Stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] for a density outside `[0, 1]`.
    pub fn seed(
        &mut self,
        density: f64,
        callback: &mut dyn GridCallback,
    ) -> Result<ClockOutcome, ClockError> {
        if self.is_running() {
            debug!(density, "Seed ignored while running");
            return Ok(ClockOutcome::Ignored);
        }
        self.grid.seed(density)?;
        callback.on_grid_changed(GridChange::Seeded, &self.grid);
        Ok(ClockOutcome::Applied)
    }

    /// Kill every cell. Only allowed while Stopped.
    pub fn clear(&mut self, callback: &mut dyn GridCallback) -> ClockOutcome {
        if self.is_running() {
            debug!("Clear ignored while running");
            return ClockOutcome::Ignored;
        }
        self.grid.clear();
        callback.on_grid_changed(GridChange::Seeded, &self.grid);
        ClockOutcome::Applied
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Write one cell directly. Only allowed while Stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] for out-of-bounds coordinates or a state
    /// the rule does not use.
    pub fn edit_cell(
        &mut self,
        row: usize,
        col: usize,
        cell: Cell,
        callback: &mut dyn GridCallback,
    ) -> Result<ClockOutcome, ClockError> {
        if self.is_running() {
            debug!(row, col, "Edit ignored while running");
            return Ok(ClockOutcome::Ignored);
        }
        self.grid.set_cell(row, col, cell)?;
        callback.on_grid_changed(GridChange::Edited { row, col }, &self.grid);
        Ok(ClockOutcome::Applied)
    }

    /// Pointer pressed on `(row, col)`. Only allowed while Stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] for out-of-bounds coordinates.
    pub fn begin_stroke(
        &mut self,
        row: usize,
        col: usize,
        button: PointerButton,
        callback: &mut dyn GridCallback,
    ) -> Result<ClockOutcome, ClockError> {
        if self.is_running() {
            debug!(row, col, "Stroke ignored while running");
            return Ok(ClockOutcome::Ignored);
        }
        let value = self.draw.begin(&mut self.grid, row, col, button)?;
        debug!(row, col, button = ?button, value = ?value, "Stroke started");
        callback.on_grid_changed(GridChange::Edited { row, col }, &self.grid);
        Ok(ClockOutcome::Applied)
    }

    /// Pointer moved onto `(row, col)`.
    ///
    /// Ignored while running or when no stroke is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] for out-of-bounds coordinates.
    pub fn continue_stroke(
        &mut self,
        row: usize,
        col: usize,
        callback: &mut dyn GridCallback,
    ) -> Result<ClockOutcome, ClockError> {
        if self.is_running() {
            return Ok(ClockOutcome::Ignored);
        }
        match self.draw.paint(&mut self.grid, row, col)? {
            Some(_) => {
                callback.on_grid_changed(GridChange::Edited { row, col }, &self.grid);
                Ok(ClockOutcome::Applied)
            }
            None => Ok(ClockOutcome::Ignored),
        }
    }

    /// Pointer released. Always allowed.
    pub const fn end_stroke(&mut self) {
        self.draw.end();
    }
}

impl SimulationClock<ManualTimer> {
    /// Let `elapsed` pass on the manual timer and run every tick that fell
    /// due. Returns the number of ticks executed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Grid`] if the generation counter overflows.
    pub fn advance_time(
        &mut self,
        elapsed: Duration,
        callback: &mut dyn GridCallback,
    ) -> Result<u32, ClockError> {
        let fires = self.timer.advance(elapsed);
        let mut executed: u32 = 0;
        for _ in 0..fires {
            if self.on_timer(callback)?.is_applied() {
                executed = executed.saturating_add(1);
            }
        }
        Ok(executed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{GridDimensions, RuleVariant};

    use super::*;
    use crate::callback::RecordingCallback;

    fn clock() -> SimulationClock<ManualTimer> {
        let grid = GridState::with_dimensions(
            GridDimensions::new(10, 10),
            RuleVariant::TwoColor,
            Some(11),
        )
        .unwrap();
        SimulationClock::new(grid, ManualTimer::new(), TickIntervals::default())
    }

    #[test]
    fn starts_stopped_at_normal_speed() {
        let clock = clock();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.speed(), Speed::Normal);
        assert!(clock.editing_allowed());
        assert!(!clock.timer().is_armed());
        assert_eq!(clock.current_interval(), Duration::from_millis(75));
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(TickIntervals::from_millis(0, 40).is_err());
        assert!(TickIntervals::from_millis(75, 0).is_err());
        assert!(TickIntervals::from_millis(75, 40).is_ok());
    }

    #[test]
    fn toggle_arms_and_disarms_timer() {
        let mut clock = clock();
        assert_eq!(clock.toggle(), ClockState::Running);
        assert!(!clock.editing_allowed());
        assert_eq!(clock.timer().period(), Some(Duration::from_millis(75)));

        assert_eq!(clock.toggle(), ClockState::Stopped);
        assert!(!clock.timer().is_armed());
        assert!(clock.editing_allowed());
    }

    #[test]
    fn running_clock_ticks_on_timer() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        clock.toggle();
        let ran = clock.advance_time(Duration::from_millis(300), &mut cb).unwrap();
        assert_eq!(ran, 4);
        assert_eq!(clock.grid().generation(), 4);
        assert_eq!(cb.advances(), 4);
    }

    #[test]
    fn stopped_clock_does_not_tick() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        assert_eq!(clock.advance_time(Duration::from_secs(1), &mut cb).unwrap(), 0);
        assert_eq!(clock.on_timer(&mut cb).unwrap(), ClockOutcome::Ignored);
        assert_eq!(clock.grid().generation(), 0);
        assert!(cb.changes.is_empty());
    }

    #[test]
    fn step_fires_exactly_one_tick_when_stopped() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        assert_eq!(clock.step(&mut cb).unwrap(), ClockOutcome::Applied);
        assert_eq!(clock.grid().generation(), 1);
        assert_eq!(cb.changes, vec![GridChange::Advanced]);

        clock.toggle();
        assert_eq!(clock.step(&mut cb).unwrap(), ClockOutcome::Ignored);
        assert_eq!(clock.grid().generation(), 1);
    }

    #[test]
    fn edits_rejected_while_running() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        assert!(clock.seed(0.3, &mut cb).unwrap().is_applied());
        let before = clock.grid().cells().to_vec();
        let population = clock.grid().population();
        cb.changes.clear();

        clock.toggle();
        assert_eq!(
            clock.edit_cell(0, 0, Cell::ColorB, &mut cb).unwrap(),
            ClockOutcome::Ignored
        );
        assert_eq!(
            clock
                .begin_stroke(1, 1, PointerButton::Primary, &mut cb)
                .unwrap(),
            ClockOutcome::Ignored
        );
        assert_eq!(clock.seed(0.9, &mut cb).unwrap(), ClockOutcome::Ignored);
        assert_eq!(clock.clear(&mut cb), ClockOutcome::Ignored);

        assert_eq!(clock.grid().cells(), before.as_slice());
        assert_eq!(clock.grid().population(), population);
        assert!(cb.changes.is_empty());
    }

    #[test]
    fn edits_applied_when_stopped_keep_counters_exact() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        let _ = clock.edit_cell(3, 3, Cell::ColorB, &mut cb).unwrap();
        let _ = clock
            .begin_stroke(4, 4, PointerButton::Primary, &mut cb)
            .unwrap();
        let _ = clock.continue_stroke(4, 5, &mut cb).unwrap();
        clock.end_stroke();
        assert_eq!(clock.continue_stroke(4, 6, &mut cb).unwrap(), ClockOutcome::Ignored);

        let population = clock.grid().population();
        assert_eq!(population.color_a, 2);
        assert_eq!(population.color_b, 1);
        assert_eq!(population, clock.grid().recount());
        assert_eq!(cb.changes.len(), 3);
    }

    #[test]
    fn starting_the_clock_ends_the_stroke() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        let _ = clock
            .begin_stroke(0, 0, PointerButton::Secondary, &mut cb)
            .unwrap();
        assert!(clock.draw_tool().is_drawing());
        clock.toggle();
        assert!(!clock.draw_tool().is_drawing());
        clock.toggle();
        assert_eq!(clock.continue_stroke(0, 1, &mut cb).unwrap(), ClockOutcome::Ignored);
    }

    #[test]
    fn set_fast_restarts_running_timer() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        clock.toggle();
        assert_eq!(clock.timer().starts(), 1);

        // 70ms into a 75ms interval, switch to 40ms: the 70ms are dropped.
        assert_eq!(clock.advance_time(Duration::from_millis(70), &mut cb).unwrap(), 0);
        clock.set_fast(true);
        assert_eq!(clock.timer().starts(), 2);
        assert_eq!(clock.timer().period(), Some(Duration::from_millis(40)));
        assert_eq!(clock.advance_time(Duration::from_millis(39), &mut cb).unwrap(), 0);
        assert_eq!(clock.advance_time(Duration::from_millis(1), &mut cb).unwrap(), 1);
    }

    #[test]
    fn set_fast_while_stopped_only_records_speed() {
        let mut clock = clock();
        clock.set_fast(true);
        assert_eq!(clock.speed(), Speed::Fast);
        assert!(!clock.timer().is_armed());
        assert_eq!(clock.toggle(), ClockState::Running);
        assert_eq!(clock.timer().period(), Some(Duration::from_millis(40)));
        assert_eq!(clock.toggle_fast(), Speed::Normal);
        assert_eq!(clock.timer().period(), Some(Duration::from_millis(75)));
    }

    #[test]
    fn status_reports_counters() {
        let mut clock = clock();
        let mut cb = RecordingCallback::default();
        let _ = clock.edit_cell(0, 0, Cell::ColorA, &mut cb).unwrap();
        let _ = clock.edit_cell(0, 1, Cell::ColorB, &mut cb).unwrap();
        let status = clock.status();
        assert_eq!(status.state, ClockState::Stopped);
        assert!(status.editing_allowed);
        assert_eq!(status.interval_ms, 75);
        assert_eq!(status.population.total(), 2);
        assert!((status.percent_a - 50.0).abs() < f64::EPSILON);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "stopped");
    }
}
