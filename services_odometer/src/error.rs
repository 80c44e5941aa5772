//! Odometer errors

use hal::MmioError;
use monitor_types::{AttributeError, ConfigError};
use thiserror::Error;

/// Errors that can occur while creating or using an odometer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OdometerError {
    /// The channel could not be resolved
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// A register access failed
    #[error("Timer register access failed: {0}")]
    Mmio(#[from] MmioError),
}

impl From<OdometerError> for AttributeError {
    fn from(err: OdometerError) -> Self {
        AttributeError::Device(err.to_string())
    }
}
