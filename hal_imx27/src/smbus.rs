//! Fake SMBus device
//!
//! Serves register bytes from a table. Failures can be queued for the next
//! transfers or made permanent, which is how tests exercise the recovery
//! paths of bus drivers.

use hal::{SmbusDevice, SmbusError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct BusState {
    registers: BTreeMap<u8, u8>,
    /// Number of upcoming transfers that must fail
    pending_failures: usize,
    offline: bool,
    /// Commands of every attempted transfer
    log: Vec<u8>,
}

/// Fake SMBus device
///
/// # Examples
///
/// ```
/// use hal::SmbusDevice;
/// use hal_imx27::FakeSmbus;
///
/// let mut bus = FakeSmbus::new();
/// bus.set_word(0x0, 0x1234_5678);
///
/// assert_eq!(bus.read_byte_data(0x0).unwrap(), 0x78);
/// assert_eq!(bus.read_byte_data(0x3).unwrap(), 0x12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeSmbus {
    state: Arc<Mutex<BusState>>,
}

impl FakeSmbus {
    /// Creates a device whose registers all read zero
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores one register byte
    pub fn set_byte(&self, command: u8, value: u8) {
        self.state().registers.insert(command, value);
    }

    /// Stores a little-endian 32-bit value in four consecutive registers
    pub fn set_word(&self, command: u8, value: u32) {
        let mut state = self.state();
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            state.registers.insert(command.wrapping_add(i as u8), byte);
        }
    }

    /// Makes the next `count` transfers fail
    pub fn fail_next(&self, count: usize) {
        self.state().pending_failures = count;
    }

    /// Makes every transfer fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Returns the commands of every attempted transfer
    pub fn log(&self) -> Vec<u8> {
        self.state().log.clone()
    }

    /// Clears the transfer log
    pub fn clear_log(&self) {
        self.state().log.clear();
    }
}

impl SmbusDevice for FakeSmbus {
    fn read_byte_data(&mut self, command: u8) -> Result<u8, SmbusError> {
        let mut state = self.state();
        state.log.push(command);
        if state.offline {
            return Err(SmbusError::Nack(command));
        }
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(SmbusError::Timeout(command));
        }
        Ok(state.registers.get(&command).copied().unwrap_or(0))
    }
}
