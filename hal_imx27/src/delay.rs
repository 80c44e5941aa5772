//! Blocking delays
//!
//! [`ThreadDelay`] sleeps the calling thread. [`RecordingDelay`] only
//! records the requested durations, optionally moving a [`SimClock`]
//! forward, so tests of pin sequences run instantly.

use crate::timer::SimClock;
use hal::DelayHal;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Delay that sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl DelayHal for ThreadDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Delay that records requests instead of sleeping
///
/// # Examples
///
/// ```
/// use hal::DelayHal;
/// use hal_imx27::{RecordingDelay, SimClock};
///
/// let clock = SimClock::new(100);
/// let mut delay = RecordingDelay::with_clock(clock.clone());
///
/// delay.delay_ms(400);
/// assert_eq!(delay.calls(), vec![400]);
/// assert_eq!(clock.now(), 40);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    calls: Arc<Mutex<Vec<u32>>>,
    clock: Option<SimClock>,
}

impl RecordingDelay {
    /// Creates a delay that only records
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a delay that also advances `clock`
    pub fn with_clock(clock: SimClock) -> Self {
        Self {
            calls: Arc::default(),
            clock: Some(clock),
        }
    }

    /// Returns every requested delay in order
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the sum of all requested delays
    pub fn total_ms(&self) -> u64 {
        self.calls().iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayHal for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(ms);
        if let Some(clock) = &self.clock {
            clock.advance_ms(u64::from(ms));
        }
    }
}
