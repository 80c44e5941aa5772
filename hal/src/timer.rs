//! # Timer Device
//!
//! Hardware abstraction for monotonic time measurement.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! Monitors timestamp accesses and measure periods through this trait. It
//! does NOT:
//! - Provide wall-clock time (no UTC, no timezones)
//! - Block or sleep (see [`DelayHal`](crate::DelayHal))
//! - Have implicit side effects
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Ticks never go backwards
//! 2. **Non-blocking**: Always returns immediately
//! 3. **Cumulative**: Returns total ticks since the source was started
//! 4. **Self-describing**: The source reports its own tick rate

/// Monotonic tick source
///
/// # Implementation Notes
///
/// - Must be monotonic (never return a smaller value)
/// - Must not block
/// - `tick_hz` must be constant for the lifetime of the source
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
///
/// fn elapsed_ms<T: TimerDevice>(timer: &mut T, since: u64) -> u64 {
///     let now = timer.poll_ticks();
///     (now - since) * 1000 / timer.tick_hz()
/// }
/// ```
pub trait TimerDevice {
    /// Returns the current tick count
    fn poll_ticks(&mut self) -> u64;

    /// Returns the number of ticks per second
    fn tick_hz(&self) -> u64;

    /// Returns the current time in whole seconds
    fn poll_seconds(&mut self) -> u64 {
        let hz = self.tick_hz().max(1);
        self.poll_ticks() / hz
    }
}
