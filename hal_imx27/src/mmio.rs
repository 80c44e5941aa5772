//! Memory-mapped register access for i.MX27
//!
//! This module provides the real volatile implementation of
//! [`RegisterIo`] and a fake physical address space for testing.
//!
//! ## Safety
//!
//! Register access is inherently unsafe as it directly interacts with
//! hardware. The `RealMmio` implementation isolates all unsafe code to its
//! constructor and three small access functions.

use hal::mmio::{check_byte_access, check_word_access};
use hal::{MmioError, MmioMapper, RegisterIo};
use std::collections::{BTreeMap, BTreeSet};
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Real hardware register window
///
/// Accesses a window that the platform layer has already mapped into the
/// address space (for instance with `ioremap`).
///
/// ## Example
///
/// ```rust,ignore
/// let mut io = unsafe { RealMmio::new(mapped_base, hal_imx27::gpt::WINDOW_LEN) }.unwrap();
/// let count = io.read32(hal_imx27::gpt::TCN)?;
/// ```
#[derive(Debug)]
pub struct RealMmio {
    base: NonNull<u8>,
    len: usize,
}

// SAFETY: The window is device memory owned by this handle; moving the
// handle to another thread moves the exclusive right to access it.
unsafe impl Send for RealMmio {}

impl RealMmio {
    /// Wraps a mapped register window
    ///
    /// Returns `None` if `base` is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// 1. `base..base + len` is mapped, readable and writable for the whole
    ///    lifetime of the returned value
    /// 2. `base` is 4-byte aligned
    /// 3. No other code accesses the window while this value is alive
    pub unsafe fn new(base: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(base).map(|base| Self { base, len })
    }
}

impl RegisterIo for RealMmio {
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn read32(&mut self, offset: usize) -> Result<u32, MmioError> {
        check_word_access(offset, self.len)?;
        // SAFETY: The offset was checked against the window length and for
        // alignment; the constructor contract guarantees the window is mapped.
        Ok(unsafe { self.base.as_ptr().add(offset).cast::<u32>().read_volatile() })
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) -> Result<(), MmioError> {
        check_word_access(offset, self.len)?;
        // SAFETY: See `read32`.
        unsafe { self.base.as_ptr().add(offset).cast::<u32>().write_volatile(value) };
        Ok(())
    }

    #[inline]
    fn read8(&mut self, offset: usize) -> Result<u8, MmioError> {
        check_byte_access(offset, self.len)?;
        // SAFETY: The offset is inside the mapped window.
        Ok(unsafe { self.base.as_ptr().add(offset).read_volatile() })
    }
}

#[derive(Debug, Default)]
struct PhysicalState {
    /// Word contents keyed by word-aligned physical address
    words: BTreeMap<u64, u32>,
    /// Live claims: (base, len, label)
    claims: Vec<(u64, usize, String)>,
    /// Bases whose mapping must fail
    failing_maps: BTreeSet<u64>,
    /// Word addresses whose accesses must fail
    failing_words: BTreeSet<u64>,
    /// Captured writes: (physical address, value)
    writes: Vec<(u64, u32)>,
}

/// Fake physical address space for testing
///
/// Behaves like plain memory: registers hold what was written or poked.
/// Claims made through [`MmioMapper::map`] are tracked so tests can check
/// that every region is released.
///
/// ## Example
///
/// ```rust
/// use hal::{MmioMapper, RegisterIo};
/// use hal_imx27::FakePhysicalMemory;
///
/// let mut memory = FakePhysicalMemory::new();
/// memory.poke(0x1002_7800, 0x1882_101D);
///
/// let mut region = memory.map(0x1002_7800, 4, "chip id").unwrap();
/// assert_eq!(region.read32(0).unwrap(), 0x1882_101D);
/// drop(region);
///
/// assert_eq!(memory.live_claims(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakePhysicalMemory {
    state: Arc<Mutex<PhysicalState>>,
}

impl FakePhysicalMemory {
    /// Creates an empty address space (every word reads as zero)
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, PhysicalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a word at a physical address
    pub fn poke(&mut self, address: u64, value: u32) {
        self.state().words.insert(address & !3, value);
    }

    /// Returns the word at a physical address
    pub fn peek(&self, address: u64) -> u32 {
        self.state().words.get(&(address & !3)).copied().unwrap_or(0)
    }

    /// Makes every later mapping of `base` fail
    pub fn fail_map_at(&mut self, base: u64) {
        self.state().failing_maps.insert(base);
    }

    /// Makes every later access to the word at `address` fail
    pub fn fail_access_at(&mut self, address: u64) {
        self.state().failing_words.insert(address & !3);
    }

    /// Returns all captured writes in order
    pub fn writes(&self) -> Vec<(u64, u32)> {
        self.state().writes.clone()
    }

    /// Returns the number of regions currently claimed
    pub fn live_claims(&self) -> usize {
        self.state().claims.len()
    }
}

impl MmioMapper for FakePhysicalMemory {
    type Region = FakeRegion;

    fn map(&mut self, base: u64, len: usize, label: &str) -> Result<FakeRegion, MmioError> {
        let mut state = self.state();
        let end = base + len as u64;
        let overlaps = state
            .claims
            .iter()
            .any(|(claimed, claimed_len, _)| base < claimed + *claimed_len as u64 && *claimed < end);
        if overlaps {
            return Err(MmioError::Busy { base, len });
        }
        if state.failing_maps.contains(&base) {
            return Err(MmioError::MapFailed { base, len });
        }
        state.claims.push((base, len, label.to_string()));
        drop(state);

        Ok(FakeRegion {
            memory: self.clone(),
            base,
            len,
        })
    }
}

/// A claimed window of [`FakePhysicalMemory`]
///
/// The claim is released when the region is dropped.
#[derive(Debug)]
pub struct FakeRegion {
    memory: FakePhysicalMemory,
    base: u64,
    len: usize,
}

impl FakeRegion {
    /// Returns the physical base of the region
    pub fn base(&self) -> u64 {
        self.base
    }

    fn word_address(&self, offset: usize) -> u64 {
        (self.base + offset as u64) & !3
    }
}

impl RegisterIo for FakeRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read32(&mut self, offset: usize) -> Result<u32, MmioError> {
        check_word_access(offset, self.len)?;
        let address = self.word_address(offset);
        let state = self.memory.state();
        if state.failing_words.contains(&address) {
            return Err(MmioError::Bus(offset));
        }
        Ok(state.words.get(&address).copied().unwrap_or(0))
    }

    fn write32(&mut self, offset: usize, value: u32) -> Result<(), MmioError> {
        check_word_access(offset, self.len)?;
        let address = self.word_address(offset);
        let mut state = self.memory.state();
        if state.failing_words.contains(&address) {
            return Err(MmioError::Bus(offset));
        }
        state.words.insert(address, value);
        state.writes.push((address, value));
        Ok(())
    }

    fn read8(&mut self, offset: usize) -> Result<u8, MmioError> {
        check_byte_access(offset, self.len)?;
        let address = self.word_address(offset);
        let lane = (self.base + offset as u64) % 4;
        let state = self.memory.state();
        if state.failing_words.contains(&address) {
            return Err(MmioError::Bus(offset));
        }
        let word = state.words.get(&address).copied().unwrap_or(0);
        Ok((word >> (lane * 8)) as u8)
    }
}

impl Drop for FakeRegion {
    fn drop(&mut self) {
        let base = self.base;
        let mut state = self.memory.state();
        if let Some(index) = state.claims.iter().position(|(claimed, _, _)| *claimed == base) {
            state.claims.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::RegisterField;

    #[test]
    fn test_real_mmio_over_local_buffer() {
        let mut backing = [0u32; 4];
        {
            // SAFETY: `backing` outlives `io` and is not touched while `io` is alive.
            let mut io = unsafe { RealMmio::new(backing.as_mut_ptr().cast(), 16) }.unwrap();
            io.write32(4, 0x1234_5678).unwrap();
            io.set_field(8, RegisterField::new(4, 4), 0xF).unwrap();
            assert_eq!(io.read32(4).unwrap(), 0x1234_5678);
            assert_eq!(io.read8(4).unwrap(), 0x1234_5678u32.to_ne_bytes()[0]);
            assert_eq!(io.read32(16), Err(MmioError::OutOfRange { offset: 16, len: 16 }));
            assert_eq!(io.write32(6, 0), Err(MmioError::Misaligned(6)));
        }
        assert_eq!(backing[1], 0x1234_5678);
        assert_eq!(backing[2], 0xF0);
    }

    #[test]
    fn test_real_mmio_rejects_null() {
        // SAFETY: A null base is rejected before any access.
        assert!(unsafe { RealMmio::new(std::ptr::null_mut(), 4) }.is_none());
    }

    #[test]
    fn test_fake_region_read_write() {
        let mut memory = FakePhysicalMemory::new();
        let mut region = memory.map(0x1000_4000, 0x18, "gpt2").unwrap();

        region.write32(0x08, 0xFFFF_FFFF).unwrap();
        assert_eq!(region.read32(0x08).unwrap(), 0xFFFF_FFFF);
        assert_eq!(memory.peek(0x1000_4008), 0xFFFF_FFFF);
        assert_eq!(memory.writes(), vec![(0x1000_4008, 0xFFFF_FFFF)]);
    }

    #[test]
    fn test_fake_region_byte_lanes() {
        let mut memory = FakePhysicalMemory::new();
        memory.poke(0x1002_8814, 0xAABB_CCDD);
        let mut region = memory.map(0x1002_8814, 4, "mac").unwrap();

        assert_eq!(region.read8(0).unwrap(), 0xDD);
        assert_eq!(region.read8(1).unwrap(), 0xCC);
        assert_eq!(region.read8(3).unwrap(), 0xAA);
    }

    #[test]
    fn test_overlapping_claim_is_busy() {
        let mut memory = FakePhysicalMemory::new();
        let _gpt = memory.map(0x1000_4000, 0x18, "gpt2").unwrap();

        assert_eq!(
            memory.map(0x1000_4010, 4, "other").unwrap_err(),
            MmioError::Busy { base: 0x1000_4010, len: 4 }
        );
        assert!(memory.map(0x1000_4018, 4, "adjacent").is_ok());
    }

    #[test]
    fn test_claim_released_on_drop() {
        let mut memory = FakePhysicalMemory::new();
        let region = memory.map(0x1000_4000, 0x18, "gpt2").unwrap();
        assert_eq!(memory.live_claims(), 1);

        drop(region);
        assert_eq!(memory.live_claims(), 0);
        assert!(memory.map(0x1000_4000, 0x18, "gpt2").is_ok());
    }

    #[test]
    fn test_injected_failures() {
        let mut memory = FakePhysicalMemory::new();
        memory.fail_map_at(0x1002_7020);
        memory.fail_access_at(0x1000_4014);

        assert_eq!(
            memory.map(0x1002_7020, 4, "pccr0").unwrap_err(),
            MmioError::MapFailed { base: 0x1002_7020, len: 4 }
        );

        let mut region = memory.map(0x1000_4000, 0x18, "gpt2").unwrap();
        assert_eq!(region.read32(0x14), Err(MmioError::Bus(0x14)));
        assert!(region.read32(0x10).is_ok());
    }
}
