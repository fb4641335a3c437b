//! Periodic tick sources.
//!
//! [`SimulationClock`](crate::clock::SimulationClock) only ever arms and
//! disarms a timer; it never waits on one. Whoever drives the clock decides
//! how fires are observed:
//!
//! - [`ManualTimer`] -- elapsed time is pushed in by hand. Used in tests and
//!   anywhere the host owns the frame loop.
//! - [`IntervalTimer`] -- a tokio [`Interval`] awaited by the command loop.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A periodic timer the clock can arm and disarm.
pub trait TickTimer: Send {
    /// Arm the timer so it fires every `period`, starting one full period
    /// from now. Re-arming an armed timer discards any partial interval.
    fn start(&mut self, period: Duration);

    /// Disarm the timer. No fire is pending afterwards.
    fn stop(&mut self);

    /// Whether the timer is armed.
    fn is_armed(&self) -> bool;

    /// The armed period, if any.
    fn period(&self) -> Option<Duration>;
}

// ---------------------------------------------------------------------------
// Manual
// ---------------------------------------------------------------------------

/// A timer driven by explicit calls to [`advance`](Self::advance).
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    /// Period while armed.
    period: Option<Duration>,
    /// Time accumulated since the last fire (or since arming).
    elapsed: Duration,
    /// Times the timer has been armed, for assertions on restarts.
    starts: u64,
}

impl ManualTimer {
    /// A disarmed timer.
    pub const fn new() -> Self {
        Self {
            period: None,
            elapsed: Duration::ZERO,
            starts: 0,
        }
    }

    /// Let `dt` pass and return how many fires fell due.
    ///
    /// A disarmed timer never fires and does not accumulate time.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let Some(period) = self.period else {
            return 0;
        };
        if period.is_zero() {
            return 0;
        }
        let elapsed = self.elapsed.saturating_add(dt).as_nanos();
        let period_ns = period.as_nanos();
        let fires = elapsed.checked_div(period_ns).unwrap_or(0);
        let leftover = elapsed.checked_rem(period_ns).unwrap_or(0);
        // The leftover is shorter than one period, so it fits a u64.
        self.elapsed = u64::try_from(leftover).map_or(Duration::ZERO, Duration::from_nanos);
        u32::try_from(fires).unwrap_or(u32::MAX)
    }

    /// Time until the next fire, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.period.map(|p| p.saturating_sub(self.elapsed))
    }

    /// How many times the timer has been armed.
    pub const fn starts(&self) -> u64 {
        self.starts
    }
}

impl TickTimer for ManualTimer {
    fn start(&mut self, period: Duration) {
        self.period = Some(period);
        self.elapsed = Duration::ZERO;
        self.starts = self.starts.saturating_add(1);
    }

    fn stop(&mut self) {
        self.period = None;
        self.elapsed = Duration::ZERO;
    }

    fn is_armed(&self) -> bool {
        self.period.is_some()
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

// ---------------------------------------------------------------------------
// Tokio
// ---------------------------------------------------------------------------

/// A timer backed by [`tokio::time::Interval`].
#[derive(Debug, Default)]
pub struct IntervalTimer {
    interval: Option<Interval>,
}

impl IntervalTimer {
    /// A disarmed timer.
    pub const fn new() -> Self {
        Self { interval: None }
    }

    /// Wait for the next fire.
    ///
    /// Pends forever while disarmed, so it can sit in a `select!` next to
    /// other branches without spinning.
    pub async fn fired(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl TickTimer for IntervalTimer {
    fn start(&mut self, period: Duration) {
        // tokio panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        let now = Instant::now();
        let first = now.checked_add(period).unwrap_or(now);
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    fn period(&self) -> Option<Duration> {
        self.interval.as_ref().map(Interval::period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_75: Duration = Duration::from_millis(75);

    #[test]
    fn disarmed_manual_timer_never_fires() {
        let mut timer = ManualTimer::new();
        assert_eq!(timer.advance(Duration::from_secs(10)), 0);
        assert!(!timer.is_armed());
        assert_eq!(timer.remaining(), None);
    }

    #[test]
    fn manual_timer_counts_due_fires() {
        let mut timer = ManualTimer::new();
        timer.start(MS_75);
        assert_eq!(timer.advance(Duration::from_millis(74)), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(timer.advance(Duration::from_millis(160)), 2);
        assert_eq!(timer.remaining(), Some(Duration::from_millis(65)));
    }

    #[test]
    fn restart_drops_partial_interval() {
        let mut timer = ManualTimer::new();
        timer.start(MS_75);
        assert_eq!(timer.advance(Duration::from_millis(70)), 0);
        timer.start(Duration::from_millis(40));
        assert_eq!(timer.advance(Duration::from_millis(39)), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(timer.starts(), 2);
    }

    #[test]
    fn stop_clears_accumulated_time() {
        let mut timer = ManualTimer::new();
        timer.start(MS_75);
        let _ = timer.advance(Duration::from_millis(50));
        timer.stop();
        timer.start(MS_75);
        assert_eq!(timer.advance(Duration::from_millis(50)), 0);
    }

    #[test]
    fn long_advance_counts_fires_and_keeps_leftover() {
        let mut timer = ManualTimer::new();
        timer.start(MS_75);
        assert_eq!(timer.advance(Duration::from_secs(1)), 13);
        assert_eq!(timer.remaining(), Some(Duration::from_millis(50)));
        assert_eq!(timer.advance(Duration::from_millis(50)), 1);
        assert_eq!(timer.remaining(), Some(MS_75));

        timer.start(Duration::from_micros(1));
        assert_eq!(timer.advance(Duration::from_secs(3600)), 3_600_000_000);
        assert_eq!(timer.remaining(), Some(Duration::from_micros(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_timer_first_fire_is_one_period_out() {
        let mut timer = IntervalTimer::new();
        timer.start(MS_75);
        assert_eq!(timer.period(), Some(MS_75));
        let before = Instant::now();
        timer.fired().await;
        assert!(before.elapsed() >= MS_75);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_interval_timer_pends() {
        let mut timer = IntervalTimer::new();
        let waited = tokio::time::timeout(Duration::from_secs(5), timer.fired()).await;
        assert!(waited.is_err());
        assert!(!timer.is_armed());
    }
}
