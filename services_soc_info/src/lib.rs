//! # SoC Information Service
//!
//! Reads the i.MX27 identification registers once and publishes them as a
//! single text dump:
//!
//! ```text
//! chip_id: 0x1882101D
//! product_rev: 0x2
//! silicon_rev: 0x21
//! suid: 0x...
//! mac_address: 0x...
//! ```
//!
//! A register that cannot be read is logged and dumped as zero.

pub mod registers;

pub use registers::{read_register, PhysRegister, REGISTERS};

use hal::{MmioError, MmioMapper};
use log::{error, info};
use monitor_types::{Attribute, AttributeError, AttributeGroup};
use thiserror::Error;

/// Name of the attribute group
pub const GROUP_NAME: &str = "imx27_internals";

/// Errors that can occur while reading an identification register
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocInfoError {
    /// The register width is not supported by its access kind
    #[error("Unsupported length {length} for register {name}")]
    InvalidLength {
        /// Register name
        name: &'static str,
        /// Rejected length in bytes
        length: usize,
    },

    /// Claiming, mapping or reading the register failed
    #[error("Register access failed: {0}")]
    Mmio(#[from] MmioError),
}

const ATTRIBUTES: [Attribute; 1] = [Attribute::read_only("internal_registers")];

/// Identification values read at load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocInfo {
    values: Vec<(PhysRegister, u64)>,
}

impl SocInfo {
    /// Reads every register of [`REGISTERS`]
    pub fn load<M: MmioMapper>(mapper: &mut M) -> Self {
        Self::load_registers(mapper, &REGISTERS)
    }

    /// Reads the given registers; failures are logged and leave zero
    pub fn load_registers<M: MmioMapper>(mapper: &mut M, registers: &[PhysRegister]) -> Self {
        let values = registers
            .iter()
            .map(|register| match read_register(mapper, register) {
                Ok(value) => {
                    info!("{}: 0x{:X}", register.name, value);
                    (*register, value)
                }
                Err(err) => {
                    error!("cannot read {}: {}", register.name, err);
                    (*register, 0)
                }
            })
            .collect();
        Self { values }
    }

    /// Returns the value of a register by name
    pub fn value(&self, name: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|(register, _)| register.name == name)
            .map(|&(_, value)| value)
    }

    /// Renders the dump, one `name: 0xVALUE` line per register
    pub fn render(&self) -> String {
        self.values
            .iter()
            .map(|(register, value)| format!("{}: 0x{:X}\n", register.name, value))
            .collect()
    }
}

impl AttributeGroup for SocInfo {
    fn name(&self) -> &str {
        GROUP_NAME
    }

    fn attributes(&self) -> &[Attribute] {
        &ATTRIBUTES
    }

    fn show(&self, attribute: &str) -> Result<String, AttributeError> {
        self.check_readable(attribute)?;
        Ok(self.render())
    }

    fn store(&self, attribute: &str, _input: &str) -> Result<usize, AttributeError> {
        self.check_writable(attribute)?;
        Err(AttributeError::PermissionDenied(attribute.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_imx27::memory_map::{IIM_BASE, SYSCTRL_BASE};
    use hal_imx27::FakePhysicalMemory;

    fn board() -> FakePhysicalMemory {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut memory = FakePhysicalMemory::new();
        memory.poke(SYSCTRL_BASE, 0x1882_101D);
        memory.poke(IIM_BASE + 0x20, 0x02);
        memory.poke(IIM_BASE + 0x24, 0x21);
        for i in 0..6u64 {
            memory.poke(IIM_BASE + 0xC04 + 4 * i, 0x10 + i as u32);
            memory.poke(IIM_BASE + 0x814 + 4 * i, 0xA0 + i as u32);
        }
        memory
    }

    #[test]
    fn test_load_and_render() {
        let mut memory = board();
        let info = SocInfo::load(&mut memory);

        assert_eq!(info.value("chip_id"), Some(0x1882_101D));
        assert_eq!(info.value("suid"), Some(0x15_1413_1211_10));
        assert_eq!(
            info.render(),
            "chip_id: 0x1882101D\n\
             product_rev: 0x2\n\
             silicon_rev: 0x21\n\
             suid: 0x151413121110\n\
             mac_address: 0xA5A4A3A2A1A0\n"
        );
        assert_eq!(memory.live_claims(), 0);
    }

    #[test]
    fn test_failed_register_reads_zero() {
        let mut memory = board();
        memory.fail_map_at(SYSCTRL_BASE);
        let info = SocInfo::load(&mut memory);
        assert_eq!(info.value("chip_id"), Some(0));
        assert_eq!(info.value("product_rev"), Some(2));
        assert!(info.render().starts_with("chip_id: 0x0\n"));
    }

    #[test]
    fn test_unknown_register_name() {
        let mut memory = board();
        let info = SocInfo::load(&mut memory);
        assert_eq!(info.value("serial"), None);
    }

    #[test]
    fn test_attribute_is_read_only() {
        let mut memory = board();
        let info = SocInfo::load(&mut memory);
        assert_eq!(info.name(), "imx27_internals");
        assert_eq!(info.show("internal_registers").unwrap(), info.render());
        assert_eq!(
            info.store("internal_registers", "1"),
            Err(AttributeError::PermissionDenied("internal_registers".to_string()))
        );
    }

    #[test]
    fn test_values_are_read_once() {
        let mut memory = board();
        let info = SocInfo::load(&mut memory);
        memory.poke(SYSCTRL_BASE, 0);
        assert!(info.show("internal_registers").unwrap().starts_with("chip_id: 0x1882101D\n"));
    }
}
