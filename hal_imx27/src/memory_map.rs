//! i.MX27 physical memory map
//!
//! Only the peripherals used by the board monitors are listed.

/// AIPI peripheral bus base
pub const AIPI_BASE: u64 = 0x1000_0000;

/// Offsets of GPT1..GPT6 from [`AIPI_BASE`]
pub const GPT_OFFSETS: [u64; 6] = [0x3000, 0x4000, 0x5000, 0x1_9000, 0x1_A000, 0x1_F000];

/// GPIO numbers of the TIN (external clock input) pad of GPT1..GPT6
pub const GPT_TIN_GPIOS: [u32; 6] = [79, 79, 79, 91, 89, 78];

/// Number of general purpose timers
pub const GPT_COUNT: u8 = 6;

/// Peripheral clock control register 0
pub const PCCR0: u64 = 0x1002_7020;

/// IIM clock enable bit in [`PCCR0`]
pub const PCCR0_IIM_EN: u32 = 1 << 16;

/// System control block base
pub const SYSCTRL_BASE: u64 = 0x1002_7800;

/// IC Identification Module base
pub const IIM_BASE: u64 = 0x1002_8000;

/// Size of the IIM window
pub const IIM_WINDOW: u64 = 0x1000;

/// Number of GPIO lines (six ports of 32 lines)
pub const GPIO_COUNT: u32 = 6 * 32;

/// Returns the physical base of GPT `id` (1-based)
pub fn gpt_base(id: u8) -> Option<u64> {
    let index = usize::from(id).checked_sub(1)?;
    GPT_OFFSETS.get(index).map(|offset| AIPI_BASE | offset)
}

/// Returns the TIN pad GPIO of GPT `id` (1-based)
pub fn gpt_tin_gpio(id: u8) -> Option<u32> {
    let index = usize::from(id).checked_sub(1)?;
    GPT_TIN_GPIOS.get(index).copied()
}

/// Returns true if `address` falls inside the IIM window
pub fn is_iim(address: u64) -> bool {
    (IIM_BASE..IIM_BASE + IIM_WINDOW).contains(&address)
}

/// Returns true if `gpio` is a line of this SoC
pub fn is_valid_gpio(gpio: u32) -> bool {
    gpio < GPIO_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt_base() {
        assert_eq!(gpt_base(1), Some(0x1000_3000));
        assert_eq!(gpt_base(2), Some(0x1000_4000));
        assert_eq!(gpt_base(6), Some(0x1001_F000));
        assert_eq!(gpt_base(0), None);
        assert_eq!(gpt_base(7), None);
    }

    #[test]
    fn test_gpt_tin_gpio() {
        assert_eq!(gpt_tin_gpio(2), Some(79));
        assert_eq!(gpt_tin_gpio(4), Some(91));
        assert_eq!(gpt_tin_gpio(6), Some(78));
        assert_eq!(gpt_tin_gpio(0), None);
    }

    #[test]
    fn test_iim_window() {
        assert!(is_iim(IIM_BASE));
        assert!(is_iim(IIM_BASE + 0x0C04));
        assert!(!is_iim(SYSCTRL_BASE));
        assert!(!is_iim(IIM_BASE + IIM_WINDOW));
    }

    #[test]
    fn test_gpio_range() {
        assert!(is_valid_gpio(0));
        assert!(is_valid_gpio(191));
        assert!(!is_valid_gpio(192));
    }
}
