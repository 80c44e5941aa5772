//! Watchdog errors

use hal::GpioError;
use monitor_types::{AttributeError, ConfigError};
use thiserror::Error;

/// Errors that can occur while driving the watchdog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// The watchdog node is missing or invalid
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// A watchdog line could not be accessed
    #[error("Watchdog line failed: {0}")]
    Gpio(#[from] GpioError),
}

impl From<WatchdogError> for AttributeError {
    fn from(err: WatchdogError) -> Self {
        AttributeError::Device(err.to_string())
    }
}
