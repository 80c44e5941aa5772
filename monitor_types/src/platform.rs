//! # Platform configuration
//!
//! The board description handed to the monitors at creation, modelled on
//! the device-tree nodes of the Thelma7 baseboard, plus module parameters
//! used when a node does not say otherwise.
//!
//! The description is read from JSON text whose keys keep the device-tree
//! spelling:
//!
//! ```
//! use monitor_types::PlatformConfig;
//!
//! let config = PlatformConfig::from_json(r#"{
//!     "odo@0": { "odo,timer": 3 },
//!     "picodo": { "gpio-reset": 12 }
//! }"#).unwrap();
//!
//! assert_eq!(config.odometer.unwrap().timer, Some(3));
//! assert!(config.watchdog.is_none());
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while resolving configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration text is not valid
    #[error("Malformed platform configuration: {0}")]
    Parse(String),

    /// A node the monitor depends on is absent
    #[error("Missing platform node {0}")]
    MissingNode(&'static str),

    /// The timer identifier is outside the usable GPTs
    #[error("Invalid timer GPT{0}, expected 2 to 6")]
    InvalidTimer(u32),

    /// A GPIO number does not exist on the SoC
    #[error("Invalid GPIO {gpio} for {role}")]
    InvalidGpio {
        /// Role of the line in the node
        role: &'static str,
        /// Rejected GPIO number
        gpio: u32,
    },
}

/// Timer odometer node (`odo@0`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OdoNode {
    /// GPT instance counting the pulses
    #[serde(rename = "odo,timer", default)]
    pub timer: Option<u32>,

    /// Highest pulse rate the input can reach
    #[serde(rename = "odo,max-pulse-hz", default)]
    pub max_pulse_hz: Option<u64>,
}

/// Hardware watchdog node (`wd@0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WatchdogNode {
    /// Input line carrying the watchdog clock
    #[serde(rename = "wd,gpio_clock")]
    pub gpio_clock: u32,

    /// Input line reporting the inhibit jumper
    #[serde(rename = "wd,gpio_inhib")]
    pub gpio_inhib: u32,

    /// Output line triggering the watchdog
    #[serde(rename = "wd,gpio_trig")]
    pub gpio_trig: u32,

    /// Watchdog period in seconds
    #[serde(rename = "wd,period_s")]
    pub period_s: u32,
}

/// I2C counter chip node (`picodo`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PicodoNode {
    /// Line driving the chip reset
    #[serde(rename = "gpio-reset")]
    pub gpio_reset: u32,
}

/// Board description
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    /// Timer odometer node
    #[serde(rename = "odo@0", default)]
    pub odometer: Option<OdoNode>,

    /// Hardware watchdog node
    #[serde(rename = "wd@0", default)]
    pub watchdog: Option<WatchdogNode>,

    /// I2C counter chip node
    #[serde(rename = "picodo", default)]
    pub picodo: Option<PicodoNode>,
}

impl PlatformConfig {
    /// Node name of the timer odometer
    pub const ODOMETER_NODE: &'static str = "odo@0";
    /// Node name of the hardware watchdog
    pub const WATCHDOG_NODE: &'static str = "wd@0";
    /// Node name of the I2C counter chip
    pub const PICODO_NODE: &'static str = "picodo";

    /// Parses a board description from JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the watchdog node or `MissingNode`
    pub fn require_watchdog(&self) -> Result<WatchdogNode, ConfigError> {
        self.watchdog.ok_or(ConfigError::MissingNode(Self::WATCHDOG_NODE))
    }

    /// Returns the counter chip node or `MissingNode`
    pub fn require_picodo(&self) -> Result<PicodoNode, ConfigError> {
        self.picodo.ok_or(ConfigError::MissingNode(Self::PICODO_NODE))
    }
}

/// Module parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModuleParams {
    /// GPT used when the platform does not name one
    #[serde(default = "ModuleParams::default_gpt_id")]
    pub gpt_id: u32,
}

impl ModuleParams {
    /// GPT used by default
    pub const DEFAULT_GPT_ID: u32 = 2;

    fn default_gpt_id() -> u32 {
        Self::DEFAULT_GPT_ID
    }

    /// Parameters selecting a specific GPT
    pub fn with_gpt(gpt_id: u32) -> Self {
        Self { gpt_id }
    }
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self::with_gpt(Self::DEFAULT_GPT_ID)
    }
}
