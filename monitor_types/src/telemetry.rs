//! Access telemetry
//!
//! Counts successful reads and remembers when the first and the last of
//! them happened. An epoch starts at creation and at every reset.

/// Read statistics of one epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessTelemetry {
    access_count: u64,
    first_access: Option<u64>,
    last_access: Option<u64>,
}

impl AccessTelemetry {
    /// Creates empty telemetry
    pub const fn new() -> Self {
        Self {
            access_count: 0,
            first_access: None,
            last_access: None,
        }
    }

    /// Records a successful access at tick `now`
    ///
    /// The first access of an epoch is kept until the next clear.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.first_access.get_or_insert(now);
        self.last_access = Some(now);
    }

    /// Starts a new epoch
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Returns the number of accesses in this epoch
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Returns the tick of the first access in this epoch
    pub fn first_access(&self) -> Option<u64> {
        self.first_access
    }

    /// Returns the tick of the latest access in this epoch
    pub fn last_access(&self) -> Option<u64> {
        self.last_access
    }

    /// Returns the mean time between accesses in milliseconds
    ///
    /// Computed as `(last - first) * 1000 / tick_hz / access_count` with
    /// integer truncation at each division; 0 before the first access.
    pub fn mean_period_ms(&self, tick_hz: u64) -> u64 {
        let (first, last) = match (self.first_access, self.last_access) {
            (Some(first), Some(last)) if self.access_count > 0 && tick_hz > 0 => (first, last),
            _ => return 0,
        };
        let span_ms = u128::from(last.saturating_sub(first)) * 1000 / u128::from(tick_hz);
        (span_ms / u128::from(self.access_count)) as u64
    }
}
