//! Tick sources
//!
//! This module provides:
//! - **FakeTimerDevice**: Scripted tick sequence for unit tests
//! - **SimClock**: Shared, manually advanced clock for multi-part tests
//! - **JiffiesClock**: Host monotonic clock scaled to a kernel tick rate
//!
//! ## Design Notes
//!
//! - All implementations are non-blocking
//! - Monotonicity is enforced
//! - The tick rate is fixed at construction

use hal::TimerDevice;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Default tick rate of the board kernel
pub const DEFAULT_HZ: u64 = 100;

/// Fake timer device for testing
///
/// Returns scripted tick values in order, then stays at the last one.
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
/// use hal_imx27::FakeTimerDevice;
///
/// let mut timer = FakeTimerDevice::new(vec![0, 100, 250], 100);
///
/// assert_eq!(timer.poll_ticks(), 0);
/// assert_eq!(timer.poll_ticks(), 100);
/// assert_eq!(timer.poll_ticks(), 250);
/// assert_eq!(timer.poll_ticks(), 250); // Stays at last value
/// ```
#[derive(Debug)]
pub struct FakeTimerDevice {
    ticks: Vec<u64>,
    index: usize,
    hz: u64,
}

impl FakeTimerDevice {
    /// Creates a fake timer with scripted tick values
    ///
    /// # Panics
    ///
    /// Panics if `ticks` is not monotonic or `hz` is zero.
    pub fn new(ticks: Vec<u64>, hz: u64) -> Self {
        assert!(hz > 0, "Tick rate must be non-zero");
        for pair in ticks.windows(2) {
            assert!(
                pair[1] >= pair[0],
                "Tick sequence must be monotonic: {} < {}",
                pair[1],
                pair[0]
            );
        }
        Self { ticks, index: 0, hz }
    }

    /// Returns the number of remaining scripted values
    pub fn remaining(&self) -> usize {
        self.ticks.len().saturating_sub(self.index)
    }
}

impl TimerDevice for FakeTimerDevice {
    fn poll_ticks(&mut self) -> u64 {
        match self.ticks.get(self.index) {
            Some(&value) => {
                self.index += 1;
                value
            }
            None => self.ticks.last().copied().unwrap_or(0),
        }
    }

    fn tick_hz(&self) -> u64 {
        self.hz
    }
}

/// Manually advanced clock shared between handles
///
/// Clones observe the same time, so a test can advance the clock that a
/// monitor owns. [`RecordingDelay`](crate::RecordingDelay) can be attached
/// to a `SimClock` so that delays move simulated time forward.
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
/// use hal_imx27::SimClock;
///
/// let clock = SimClock::new(100);
/// let mut handle = clock.clone();
///
/// clock.advance(250);
/// assert_eq!(handle.poll_ticks(), 250);
/// assert_eq!(handle.poll_seconds(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    ticks: Arc<AtomicU64>,
    hz: u64,
}

impl SimClock {
    /// Creates a clock at tick zero
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero.
    pub fn new(hz: u64) -> Self {
        assert!(hz > 0, "Tick rate must be non-zero");
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            hz,
        }
    }

    /// Moves the clock forward by `ticks`
    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Moves the clock forward by `ms` milliseconds, rounded down to ticks
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * self.hz / 1000);
    }

    /// Moves the clock to `ticks`; earlier values are ignored
    pub fn set(&self, ticks: u64) {
        self.ticks.fetch_max(ticks, Ordering::SeqCst);
    }

    /// Returns the current tick count without polling
    pub fn now(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl TimerDevice for SimClock {
    fn poll_ticks(&mut self) -> u64 {
        self.now()
    }

    fn tick_hz(&self) -> u64 {
        self.hz
    }
}

/// Host monotonic clock expressed in kernel ticks
///
/// Counts ticks of `hz` since the clock was created.
#[derive(Debug, Clone)]
pub struct JiffiesClock {
    start: Instant,
    hz: u64,
}

impl JiffiesClock {
    /// Creates a clock ticking at `hz` (zero is raised to one)
    pub fn new(hz: u64) -> Self {
        Self {
            start: Instant::now(),
            hz: hz.max(1),
        }
    }
}

impl Default for JiffiesClock {
    fn default() -> Self {
        Self::new(DEFAULT_HZ)
    }
}

impl TimerDevice for JiffiesClock {
    fn poll_ticks(&mut self) -> u64 {
        let elapsed = self.start.elapsed();
        (elapsed.as_micros() * u128::from(self.hz) / 1_000_000) as u64
    }

    fn tick_hz(&self) -> u64 {
        self.hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_timer_sequence() {
        let mut timer = FakeTimerDevice::new(vec![0, 10, 20], 100);
        assert_eq!(timer.remaining(), 3);
        assert_eq!(timer.poll_ticks(), 0);
        assert_eq!(timer.poll_ticks(), 10);
        assert_eq!(timer.remaining(), 1);
        assert_eq!(timer.poll_ticks(), 20);
        assert_eq!(timer.poll_ticks(), 20);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_fake_timer_empty() {
        let mut timer = FakeTimerDevice::new(vec![], 100);
        assert_eq!(timer.poll_ticks(), 0);
    }

    #[test]
    #[should_panic(expected = "monotonic")]
    fn test_fake_timer_rejects_non_monotonic() {
        FakeTimerDevice::new(vec![10, 5], 100);
    }

    #[test]
    fn test_sim_clock_shared() {
        let clock = SimClock::new(100);
        let mut other = clock.clone();
        clock.advance(5);
        clock.advance_ms(1000);
        assert_eq!(other.poll_ticks(), 105);
        assert_eq!(other.tick_hz(), 100);
    }

    #[test]
    fn test_sim_clock_never_goes_back() {
        let clock = SimClock::new(100);
        clock.set(500);
        clock.set(100);
        assert_eq!(clock.now(), 500);
    }

    #[test]
    fn test_jiffies_clock_monotonic() {
        let mut clock = JiffiesClock::new(1000);
        let t1 = clock.poll_ticks();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let t2 = clock.poll_ticks();
        assert!(t2 > t1);
        assert_eq!(JiffiesClock::new(0).tick_hz(), 1);
    }
}
