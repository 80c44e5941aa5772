//! SMBus device abstraction
//!
//! Byte-oriented register access to a device on an I2C bus. The bus
//! address is bound when the device handle is created.

use thiserror::Error;

/// Errors that can occur during an SMBus transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmbusError {
    /// The device did not acknowledge
    #[error("No acknowledge from device at command {0:#04x}")]
    Nack(u8),

    /// The transfer did not complete in time
    #[error("Transfer timed out at command {0:#04x}")]
    Timeout(u8),

    /// The bus reported an arbitration loss or other fault
    #[error("Bus fault at command {0:#04x}")]
    Bus(u8),
}

/// A device on an SMBus
pub trait SmbusDevice {
    /// Reads one data byte from register `command`
    fn read_byte_data(&mut self, command: u8) -> Result<u8, SmbusError>;
}
