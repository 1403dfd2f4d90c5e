use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Integer-nanosecond engine clock reading.
///
/// Timestamps are measured from the moment an engine (or clock) was created,
/// not from the Unix epoch, so two passes run at the same engine time carry
/// identical timestamps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// The engine epoch.
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create a timestamp from a raw nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Create a timestamp from seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_secs(secs: f64) -> Self {
        Self {
            nanos: (secs.max(0.0) * 1_000_000_000.0) as u64,
        }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Elapsed milliseconds (truncated).
    #[must_use]
    pub const fn millis(&self) -> u64 {
        self.nanos / 1_000_000
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Time elapsed since `earlier`. Zero if `earlier` is ahead.
    #[must_use]
    pub const fn elapsed_since(&self, earlier: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    #[allow(clippy::cast_possible_truncation)]
    fn add(self, rhs: Duration) -> Self {
        Self {
            nanos: self.nanos.saturating_add(rhs.as_nanos() as u64),
        }
    }
}

impl AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.elapsed_since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{millis:03}s")
    }
}

// ---------------------------------------------------------------------------
// IntervalTimer
// ---------------------------------------------------------------------------

/// Fires once whenever a configured interval has elapsed since it last fired.
///
/// Unlike a fixed-step accumulator, surplus time is discarded when the timer
/// fires: a slow frame produces one pass, never a burst of catch-up passes.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
}

impl IntervalTimer {
    /// Create a timer with the given interval.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a timer from an interval in seconds. Negative values clamp to zero.
    pub fn from_secs(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Feed `delta` into the timer. Returns `true` if the interval elapsed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }

    /// Time accumulated since the timer last fired.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The configured interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Restart the interval, e.g. after an on-demand pass.
    pub const fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source with a suspension point, used by blocking discovery loops.
pub trait Clock {
    /// Current reading.
    fn now(&self) -> Timestamp;

    /// Suspend the caller for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.origin.elapsed().as_nanos() as u64)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deterministic clock whose `sleep` advances time instantly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Timestamp,
    sleeps: u32,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self {
            now: Timestamp::ZERO,
            sleeps: 0,
        }
    }

    /// Advance time without counting a sleep.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    /// Number of times `sleep` has been called.
    pub const fn sleeps(&self) -> u32 {
        self.sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps += 1;
        self.now += duration;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Timestamp ----

    #[test]
    fn timestamp_from_secs() {
        let t = Timestamp::from_secs(2.5);
        assert_eq!(t.nanos(), 2_500_000_000);
        assert_eq!(t.millis(), 2_500);
    }

    #[test]
    fn timestamp_negative_secs_clamp_to_zero() {
        assert_eq!(Timestamp::from_secs(-1.0), Timestamp::ZERO);
    }

    #[test]
    fn timestamp_add_duration() {
        let t = Timestamp::ZERO + Duration::from_millis(1500);
        assert_eq!(t.millis(), 1500);
    }

    #[test]
    fn timestamp_sub_saturates() {
        let a = Timestamp::from_nanos(10);
        let b = Timestamp::from_nanos(20);
        assert_eq!(a - b, Duration::ZERO);
        assert_eq!(b - a, Duration::from_nanos(10));
    }

    #[test]
    fn timestamp_display() {
        assert_eq!(Timestamp::from_nanos(1_234_000_000).to_string(), "1.234s");
        assert_eq!(Timestamp::ZERO.to_string(), "0.000s");
    }

    // ---- IntervalTimer ----

    #[test]
    fn interval_fires_after_interval() {
        let mut timer = IntervalTimer::new(Duration::from_millis(500));
        assert!(!timer.tick(Duration::from_millis(200)));
        assert!(!timer.tick(Duration::from_millis(200)));
        assert!(timer.tick(Duration::from_millis(200)));
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn interval_discards_surplus() {
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        assert!(timer.tick(Duration::from_secs(5)));
        // No backlog of catch-up firings.
        assert!(!timer.tick(Duration::from_millis(10)));
    }

    #[test]
    fn interval_reset_restarts_window() {
        let mut timer = IntervalTimer::from_secs(1.0);
        assert!(!timer.tick(Duration::from_millis(900)));
        timer.reset();
        assert!(!timer.tick(Duration::from_millis(900)));
        assert!(timer.tick(Duration::from_millis(100)));
    }

    #[test]
    fn zero_interval_fires_every_tick() {
        let mut timer = IntervalTimer::new(Duration::ZERO);
        assert!(timer.tick(Duration::ZERO));
        assert!(timer.tick(Duration::ZERO));
    }

    // ---- Clocks ----

    #[test]
    fn manual_clock_sleep_advances() {
        let mut clock = ManualClock::new();
        clock.sleep(Duration::from_millis(250));
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.now().millis(), 500);
        assert_eq!(clock.sleeps(), 2);
    }

    #[test]
    fn manual_clock_advance_does_not_count_sleep() {
        let mut clock = ManualClock::new();
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.sleeps(), 0);
        assert_eq!(clock.now().millis(), 1000);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
