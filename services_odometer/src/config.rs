//! Channel resolution
//!
//! Picks the GPT that counts the odometer pulses: the platform node wins,
//! the module parameter is the fallback. Either way the timer must be one
//! of GPT2 to GPT6 (GPT1 belongs to the system tick).

use hal_imx27::gpt;
use hal_imx27::memory_map;
use log::info;
use monitor_types::{ConfigError, ModuleParams, PlatformConfig};
use std::ops::RangeInclusive;

/// GPT instances usable as odometer channel
pub const USABLE_GPTS: RangeInclusive<u32> = 2..=6;

/// A fully resolved counting channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedChannel {
    /// GPT instance (1-based)
    pub gpt_id: u8,
    /// Physical base of the register window
    pub phys_base: u64,
    /// Length of the register window
    pub window_len: usize,
    /// GPIO of the TIN pad feeding the pulses
    pub tin_gpio: u32,
    /// Highest expected pulse rate, enables the poll-rate guard
    pub max_pulse_hz: Option<u64>,
}

impl ResolvedChannel {
    /// Resolves the channel of GPT `gpt_id` without a pulse-rate limit
    pub fn for_gpt(gpt_id: u32) -> Result<Self, ConfigError> {
        if !USABLE_GPTS.contains(&gpt_id) {
            return Err(ConfigError::InvalidTimer(gpt_id));
        }
        let id = u8::try_from(gpt_id).map_err(|_| ConfigError::InvalidTimer(gpt_id))?;
        let phys_base = memory_map::gpt_base(id).ok_or(ConfigError::InvalidTimer(gpt_id))?;
        let tin_gpio = memory_map::gpt_tin_gpio(id).ok_or(ConfigError::InvalidTimer(gpt_id))?;

        Ok(Self {
            gpt_id: id,
            phys_base,
            window_len: gpt::WINDOW_LEN,
            tin_gpio,
            max_pulse_hz: None,
        })
    }

    /// Sets the highest expected pulse rate
    pub fn with_max_pulse_hz(mut self, max_pulse_hz: Option<u64>) -> Self {
        self.max_pulse_hz = max_pulse_hz.filter(|&hz| hz > 0);
        self
    }
}

/// Resolves the channel from the platform node or the module parameter
pub fn resolve_channel(
    platform: &PlatformConfig,
    params: &ModuleParams,
) -> Result<ResolvedChannel, ConfigError> {
    let node = platform.odometer.as_ref();
    let gpt_id = match node.and_then(|node| node.timer) {
        Some(timer) => {
            info!("odo: using GPT{} from platform node {}", timer, PlatformConfig::ODOMETER_NODE);
            timer
        }
        None => {
            info!("odo: no timer in platform configuration, using GPT{} from parameters", params.gpt_id);
            params.gpt_id
        }
    };

    let max_pulse_hz = node.and_then(|node| node.max_pulse_hz);
    Ok(ResolvedChannel::for_gpt(gpt_id)?.with_max_pulse_hz(max_pulse_hz))
}
