//! # Register Fields
//!
//! A typed description of a bit-field inside a 32-bit register.
//!
//! ## Philosophy
//!
//! **A field is a value, not a mask expression.**
//!
//! Drivers describe each field once (position and width) and use the pure
//! [`RegisterField::apply`] to compute the new register content. The
//! read-modify-write against hardware is done by
//! [`RegisterIo::set_field`](crate::RegisterIo::set_field).

/// A bit-field of a 32-bit register
///
/// `offset` is the position of the least significant bit of the field,
/// `width` the number of bits it spans.
///
/// # Examples
///
/// ```
/// use hal::RegisterField;
///
/// const CLKSOURCE: RegisterField = RegisterField::new(1, 3);
///
/// assert_eq!(CLKSOURCE.mask(), 0b1110);
/// assert_eq!(CLKSOURCE.apply(0xFFFF_FFFF, 0x3), 0xFFFF_FFF7);
/// assert_eq!(CLKSOURCE.extract(0xFFFF_FFF7), 0x3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterField {
    /// Position of the least significant bit
    pub offset: u32,
    /// Number of bits
    pub width: u32,
}

impl RegisterField {
    /// Creates a field description
    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    /// Returns the mask covering the field bits in register position
    pub const fn mask(&self) -> u32 {
        let bits = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        bits << self.offset
    }

    /// Computes the register value with the field replaced by `value`
    ///
    /// All bits outside the field are kept. `value` is shifted into place
    /// and OR-ed in without being truncated to the field width: keeping
    /// the value in range is the caller's job.
    pub const fn apply(&self, current: u32, value: u32) -> u32 {
        (current & !self.mask()) | (value << self.offset)
    }

    /// Extracts the field value from a register value
    pub const fn extract(&self, register: u32) -> u32 {
        (register & self.mask()) >> self.offset
    }

    /// Returns true if any bit of the field is set in `register`
    pub const fn is_set(&self, register: u32) -> bool {
        register & self.mask() != 0
    }
}
