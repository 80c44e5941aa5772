//! # Identification registers
//!
//! Two kinds of registers hold the identification values:
//!
//! - **Plain** registers are ordinary 32-bit words. A value spans one or two
//!   consecutive words, least significant word first.
//! - **IIM** fuse banks store one byte per 32-bit slot. A value spans up to
//!   eight slots, least significant byte first, and the IIM clock must be
//!   running to read them.
//!
//! Every read claims and maps its window, and releases it before returning.

use crate::SocInfoError;
use hal::{MmioMapper, RegisterIo};
use hal_imx27::memory_map::{self, IIM_BASE, PCCR0, PCCR0_IIM_EN, SYSCTRL_BASE};

/// Largest value width in bytes
pub const MAX_LENGTH: usize = 8;

/// An identification register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysRegister {
    /// Name used in the dump
    pub name: &'static str,
    /// Physical address
    pub address: u64,
    /// Value width in bytes
    pub length: usize,
}

impl PhysRegister {
    /// Describes a register
    pub const fn new(name: &'static str, address: u64, length: usize) -> Self {
        Self { name, address, length }
    }

    /// Returns true if the register lives in the IIM fuse banks
    pub fn is_iim(&self) -> bool {
        memory_map::is_iim(self.address)
    }
}

/// Registers dumped by the service, in dump order
pub const REGISTERS: [PhysRegister; 5] = [
    PhysRegister::new("chip_id", SYSCTRL_BASE, 4),
    PhysRegister::new("product_rev", IIM_BASE + 0x20, 4),
    PhysRegister::new("silicon_rev", IIM_BASE + 0x24, 4),
    PhysRegister::new("suid", IIM_BASE + 0xC04, 6),
    PhysRegister::new("mac_address", IIM_BASE + 0x814, 6),
];

/// Reads a register through `mapper`, picking the access kind from its
/// address
pub fn read_register<M: MmioMapper>(mapper: &mut M, register: &PhysRegister) -> Result<u64, SocInfoError> {
    if register.is_iim() {
        read_iim(mapper, register)
    } else {
        read_plain(mapper, register)
    }
}

/// Reads a plain register as 32-bit words
///
/// The length must be a multiple of 4 and at most [`MAX_LENGTH`].
pub fn read_plain<M: MmioMapper>(mapper: &mut M, register: &PhysRegister) -> Result<u64, SocInfoError> {
    if register.length % 4 != 0 || register.length > MAX_LENGTH {
        return Err(SocInfoError::InvalidLength {
            name: register.name,
            length: register.length,
        });
    }

    let mut region = mapper.map(register.address, register.length, "Mem register")?;
    let mut value = 0u64;
    for word in 0..register.length / 4 {
        let data = region.read32(word * 4)?;
        value |= u64::from(data) << (32 * word);
    }
    Ok(value)
}

/// Reads an IIM register as bytes spread over 32-bit slots
///
/// The length must be at most [`MAX_LENGTH`]. Enables the IIM clock first.
pub fn read_iim<M: MmioMapper>(mapper: &mut M, register: &PhysRegister) -> Result<u64, SocInfoError> {
    if register.length > MAX_LENGTH {
        return Err(SocInfoError::InvalidLength {
            name: register.name,
            length: register.length,
        });
    }

    let mut clocks = mapper.map(PCCR0, 4, "Peripheral clock control")?;
    let control = clocks.read32(0)?;
    clocks.write32(0, control | PCCR0_IIM_EN)?;

    let mut region = mapper.map(register.address, register.length * 4, "IIM register")?;
    let mut value = 0u64;
    for byte in 0..register.length {
        let data = region.read8(byte * 4)?;
        value |= u64::from(data) << (8 * byte);
    }
    Ok(value)
}
