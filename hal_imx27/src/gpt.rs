//! # General Purpose Timer (GPT) register map
//!
//! Register offsets and fields of one i.MX27 GPT instance. Offsets are
//! relative to the instance base (see [`memory_map::gpt_base`]).
//!
//! [`memory_map::gpt_base`]: crate::memory_map::gpt_base

use hal::RegisterField;

/// Control register
pub const TCTL: usize = 0x00;
/// Prescaler register
pub const TPRER: usize = 0x04;
/// Compare register
pub const TCMP: usize = 0x08;
/// Counter register (read-only)
pub const TCN: usize = 0x10;
/// Status register (write 1 to clear)
pub const TSTAT: usize = 0x14;

/// Size of the register window of one GPT
pub const WINDOW_LEN: usize = 0x18;

/// Fields of [`TCTL`]
pub mod tctl {
    use super::RegisterField;

    /// Timer enable
    pub const TEN: RegisterField = RegisterField::new(0, 1);
    /// Clock source select
    pub const CLKSOURCE: RegisterField = RegisterField::new(1, 3);
    /// Compare event enable
    pub const COMP_EN: RegisterField = RegisterField::new(4, 1);
    /// Free-run (1) or restart-on-compare (0)
    pub const FRR: RegisterField = RegisterField::new(8, 1);
    /// Counter clear when the timer is disabled
    pub const CC: RegisterField = RegisterField::new(10, 1);
}

/// Fields of [`TPRER`]
pub mod tprer {
    use super::RegisterField;

    /// Divide ratio minus one
    pub const PRESCALER: RegisterField = RegisterField::new(0, 10);
}

/// Fields of [`TCMP`]
pub mod tcmp {
    use super::RegisterField;

    /// Compare value
    pub const COMPARE: RegisterField = RegisterField::new(0, 32);
}

/// Fields of [`TSTAT`]
pub mod tstat {
    use super::RegisterField;

    /// Compare event occurred
    pub const COMP: RegisterField = RegisterField::new(0, 1);
}

/// Values of [`tctl::CLKSOURCE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockSource {
    /// Counter stopped
    Stop = 0,
    /// Peripheral clock
    PerClk = 1,
    /// Peripheral clock divided by 4
    PerClkDiv4 = 2,
    /// External pulses on the TIN pad
    Tin = 3,
    /// 32 kHz reference clock
    Clk32k = 4,
}

impl ClockSource {
    /// Returns the field value
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decodes a field value
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Stop),
            1 => Some(Self::PerClk),
            2 => Some(Self::PerClkDiv4),
            3 => Some(Self::Tin),
            4..=7 => Some(Self::Clk32k),
            _ => None,
        }
    }
}
