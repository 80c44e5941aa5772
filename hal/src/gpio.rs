//! GPIO line abstraction
//!
//! A single general purpose pin, already claimed by the board layer. The
//! line can be switched between input (released, high impedance) and driven
//! output at any time.

use thiserror::Error;

/// Errors that can occur while using a GPIO line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// The line number does not exist on this SoC
    #[error("Invalid GPIO {0}")]
    InvalidLine(u32),

    /// The line is claimed by another user
    #[error("GPIO {0} not available")]
    Unavailable(u32),

    /// The direction change or level access failed
    #[error("GPIO {0} access failed")]
    Access(u32),
}

/// A general purpose I/O line
pub trait GpioLine {
    /// Returns the line number
    fn number(&self) -> u32;

    /// Reads the current level of the line
    fn is_high(&mut self) -> Result<bool, GpioError>;

    /// Drives the line to the given level
    ///
    /// The line must already be an output.
    fn set_level(&mut self, high: bool) -> Result<(), GpioError>;

    /// Switches the line to a driven output with an initial level
    fn set_output(&mut self, high: bool) -> Result<(), GpioError>;

    /// Switches the line to an input, releasing any driven level
    fn set_input(&mut self) -> Result<(), GpioError>;
}
