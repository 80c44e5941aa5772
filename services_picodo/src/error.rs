//! Counter chip errors

use hal::{GpioError, SmbusError};
use monitor_types::{AttributeError, ConfigError};
use thiserror::Error;

/// Errors that can occur while driving the counter chip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PicodoError {
    /// The chip node is missing or invalid
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// An SMBus transfer failed
    #[error("Counter chip transfer failed: {0}")]
    Bus(#[from] SmbusError),

    /// The reset line could not be driven
    #[error("Counter chip reset line failed: {0}")]
    Gpio(#[from] GpioError),
}

impl From<PicodoError> for AttributeError {
    fn from(err: PicodoError) -> Self {
        AttributeError::Device(err.to_string())
    }
}
