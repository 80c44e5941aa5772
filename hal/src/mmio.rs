//! # Memory-Mapped Register Access
//!
//! Trait-based abstraction over a mapped window of 32-bit device registers.
//!
//! ## Design
//!
//! - A [`RegisterIo`] is a window of registers addressed by byte offset
//!   from the start of the window
//! - Access is fallible: a bus fault or an out-of-window offset is reported,
//!   never ignored
//! - A [`MmioMapper`] claims and maps a physical window; the returned region
//!   releases the claim when dropped

use thiserror::Error;

use crate::field::RegisterField;

/// Errors that can occur while accessing device registers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MmioError {
    /// Offset outside the mapped window
    #[error("Offset {offset:#x} outside register window of {len:#x} bytes")]
    OutOfRange { offset: usize, len: usize },

    /// 32-bit access at an offset that is not 4-byte aligned
    #[error("Misaligned register access at offset {0:#x}")]
    Misaligned(usize),

    /// The physical window is already claimed by another user
    #[error("Memory region {base:#x}+{len:#x} busy")]
    Busy { base: u64, len: usize },

    /// The physical window could not be mapped
    #[error("Unable to map memory region {base:#x}+{len:#x}")]
    MapFailed { base: u64, len: usize },

    /// The access did not complete on the bus
    #[error("Bus error at offset {0:#x}")]
    Bus(usize),
}

/// A mapped window of device registers
///
/// ## Implementation Notes
///
/// Implementations must guarantee:
/// - Accesses are performed in program order and are never merged or cached
/// - `read32`/`write32` reject offsets that are not 4-byte aligned
/// - Offsets at or beyond `len()` are rejected with [`MmioError::OutOfRange`]
pub trait RegisterIo {
    /// Returns the window length in bytes
    fn len(&self) -> usize;

    /// Reads a 32-bit register
    fn read32(&mut self, offset: usize) -> Result<u32, MmioError>;

    /// Writes a 32-bit register
    fn write32(&mut self, offset: usize, value: u32) -> Result<(), MmioError>;

    /// Reads a single byte
    fn read8(&mut self, offset: usize) -> Result<u8, MmioError>;

    /// Replaces one bit-field of a register, leaving the other bits untouched
    ///
    /// Reads the register, applies `field` with `value` and writes the result
    /// back. `value` is not validated against the field width.
    ///
    /// # Errors
    ///
    /// Propagates the failure of either the read or the write.
    fn set_field(
        &mut self,
        offset: usize,
        field: RegisterField,
        value: u32,
    ) -> Result<(), MmioError> {
        let current = self.read32(offset)?;
        self.write32(offset, field.apply(current, value))
    }
}

impl<R: RegisterIo + ?Sized> RegisterIo for &mut R {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read32(&mut self, offset: usize) -> Result<u32, MmioError> {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) -> Result<(), MmioError> {
        (**self).write32(offset, value)
    }

    fn read8(&mut self, offset: usize) -> Result<u8, MmioError> {
        (**self).read8(offset)
    }
}

/// Claims and maps physical register windows
///
/// This is the equivalent of requesting a memory region and remapping it.
/// The claim lasts as long as the returned region is alive.
pub trait MmioMapper {
    /// Mapped region type
    type Region: RegisterIo;

    /// Claims and maps `len` bytes at physical address `base`
    ///
    /// `label` names the user of the region for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`MmioError::Busy`] if the window overlaps a live claim and
    /// [`MmioError::MapFailed`] if it cannot be mapped.
    fn map(&mut self, base: u64, len: usize, label: &str) -> Result<Self::Region, MmioError>;
}

/// Checks a 32-bit access against a window length
///
/// Shared by implementations so that every backend rejects the same
/// offsets.
pub fn check_word_access(offset: usize, len: usize) -> Result<(), MmioError> {
    if offset % 4 != 0 {
        return Err(MmioError::Misaligned(offset));
    }
    if offset.checked_add(4).map_or(true, |end| end > len) {
        return Err(MmioError::OutOfRange { offset, len });
    }
    Ok(())
}

/// Checks a byte access against a window length
pub fn check_byte_access(offset: usize, len: usize) -> Result<(), MmioError> {
    if offset >= len {
        return Err(MmioError::OutOfRange { offset, len });
    }
    Ok(())
}
