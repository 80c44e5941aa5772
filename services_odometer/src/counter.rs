//! Overflow-extended counter
//!
//! The GPT counts 32 bits and latches its compare flag each time it
//! restarts at zero. Folding every flag into a software high word gives a
//! 64-bit count, as long as the flag is consumed at least once per wrap.

use hal::{MmioError, RegisterIo};
use hal_imx27::gpt::{self, tstat};

/// Software high word on top of the hardware counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedCounter {
    high_word: u32,
}

impl ExtendedCounter {
    /// Creates a counter with a zero high word
    pub const fn new() -> Self {
        Self { high_word: 0 }
    }

    /// Returns the number of wraps seen since the last clear
    pub fn high_word(&self) -> u32 {
        self.high_word
    }

    /// Zeroes the high word
    pub fn clear(&mut self) {
        self.high_word = 0;
    }

    /// Combines the high word with a low count
    pub fn combine(&self, low: u32) -> u64 {
        (u64::from(self.high_word) << 32) | u64::from(low)
    }

    /// Reads the extended count
    ///
    /// A pending compare flag is cleared before the high word is
    /// incremented, so a failed clear leaves the flag for the next query.
    /// The low count is always read fresh.
    pub fn query<R: RegisterIo>(&mut self, io: &mut R) -> Result<u64, MmioError> {
        let status = io.read32(gpt::TSTAT)?;
        if tstat::COMP.is_set(status) {
            io.write32(gpt::TSTAT, tstat::COMP.mask())?;
            self.high_word = self.high_word.wrapping_add(1);
        }

        let low = io.read32(gpt::TCN)?;
        Ok(self.combine(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{configure, ChannelState};
    use hal_imx27::SimGpt;

    fn running_timer() -> SimGpt {
        let mut timer = SimGpt::new();
        let mut state = ChannelState::Uninitialized;
        configure(&mut timer, &mut state).unwrap();
        timer
    }

    #[test]
    fn test_combine() {
        let mut counter = ExtendedCounter::new();
        assert_eq!(counter.combine(5), 5);
        counter.high_word = 2;
        assert_eq!(counter.combine(0xFFFF_FFFF), 0x2_FFFF_FFFF);
    }

    #[test]
    fn test_query_without_wrap() {
        let mut timer = running_timer();
        let mut counter = ExtendedCounter::new();
        timer.pulse(1234);
        assert_eq!(counter.query(&mut timer).unwrap(), 1234);
        assert_eq!(counter.high_word(), 0);
    }

    #[test]
    fn test_one_flag_event_adds_one() {
        let mut timer = running_timer();
        let mut counter = ExtendedCounter::new();
        timer.preload_count(u32::MAX - 1);
        timer.pulse(5);

        assert_eq!(counter.query(&mut timer).unwrap(), (1 << 32) | 3);
        assert_eq!(counter.high_word(), 1);
        assert!(!timer.compare_pending());

        // Flag already consumed
        assert_eq!(counter.query(&mut timer).unwrap(), (1 << 32) | 3);
        assert_eq!(counter.high_word(), 1);
    }

    #[test]
    fn test_failed_clear_does_not_increment() {
        let mut timer = running_timer();
        let mut counter = ExtendedCounter::new();
        timer.preload_count(u32::MAX);
        timer.pulse(1);

        // The status read succeeds, the clear write fails
        let mut writes_fail = FailingWrites(&mut timer);
        assert!(counter.query(&mut writes_fail).is_err());
        assert_eq!(counter.high_word(), 0);
        assert!(timer.compare_pending());

        assert_eq!(counter.query(&mut timer).unwrap(), 1 << 32);
    }

    #[test]
    fn test_failed_low_read_keeps_consumed_wrap() {
        let mut timer = running_timer();
        let mut counter = ExtendedCounter::new();
        timer.preload_count(u32::MAX);
        timer.pulse(2);

        timer.fail_next(gpt::TCN);
        assert_eq!(counter.query(&mut timer), Err(MmioError::Bus(gpt::TCN)));
        assert_eq!(counter.high_word(), 1);
        assert_eq!(counter.query(&mut timer).unwrap(), (1 << 32) | 1);
    }

    #[test]
    fn test_clear() {
        let mut counter = ExtendedCounter { high_word: 9 };
        counter.clear();
        assert_eq!(counter, ExtendedCounter::new());
    }

    /// Passes reads through and rejects every write
    struct FailingWrites<'a>(&'a mut SimGpt);

    impl RegisterIo for FailingWrites<'_> {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn read32(&mut self, offset: usize) -> Result<u32, MmioError> {
            self.0.read32(offset)
        }

        fn write32(&mut self, offset: usize, _value: u32) -> Result<(), MmioError> {
            Err(MmioError::Bus(offset))
        }

        fn read8(&mut self, offset: usize) -> Result<u8, MmioError> {
            self.0.read8(offset)
        }
    }
}
