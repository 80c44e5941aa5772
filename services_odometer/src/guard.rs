//! Poll-rate guard
//!
//! The extended counter only sees one wrap per query. If two queries are
//! further apart than the time the hardware needs to wrap at the highest
//! pulse rate, a wrap may have been lost. The guard cannot recover it, but
//! it counts and reports such windows.

use log::warn;

/// Detects queries spaced wider than one wrap period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollGuard {
    wrap_period_ticks: Option<u64>,
    missed: u64,
}

impl PollGuard {
    /// Creates a guard for a channel pulsing at most `max_pulse_hz`
    ///
    /// Without a rate (or with a zero rate) the guard never fires.
    pub fn new(max_pulse_hz: Option<u64>, tick_hz: u64) -> Self {
        let wrap_period_ticks = max_pulse_hz.filter(|&hz| hz > 0).map(|hz| {
            let ticks = (1u128 << 32) * u128::from(tick_hz) / u128::from(hz);
            u64::try_from(ticks).unwrap_or(u64::MAX)
        });
        Self {
            wrap_period_ticks,
            missed: 0,
        }
    }

    /// Returns the wrap period at the highest pulse rate, in ticks
    pub fn wrap_period_ticks(&self) -> Option<u64> {
        self.wrap_period_ticks
    }

    /// Returns the number of windows where a wrap may have been lost
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Checks the spacing between the previous query and `now`
    ///
    /// Returns true if the spacing exceeded the wrap period.
    pub fn observe(&mut self, previous: Option<u64>, now: u64) -> bool {
        let (period, previous) = match (self.wrap_period_ticks, previous) {
            (Some(period), Some(previous)) => (period, previous),
            _ => return false,
        };
        let elapsed = now.saturating_sub(previous);
        if elapsed <= period {
            return false;
        }
        self.missed += 1;
        warn!(
            "odo: {} ticks between reads exceed the wrap period of {} ticks, an overflow may be lost",
            elapsed, period
        );
        true
    }
}
