//! # Simulated General Purpose Timer
//!
//! Deterministic model of one i.MX27 GPT instance for testing.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! The simulated counter only advances when a test feeds it pulses with
//! [`SimGpt::pulse`]. The model implements the parts of the GPT that the
//! odometer relies on:
//!
//! - Pulses are counted only while `TEN` is set and the clock source is TIN
//! - Restart mode: on the pulse after reaching `TCMP` the counter restarts
//!   at zero and the compare flag latches
//! - Free-run mode: the counter wraps at 2^32, the flag latches when the
//!   count passes `TCMP`
//! - Clearing `TEN` while `CC` is set clears the counter
//! - `TSTAT` is write-1-to-clear, `TCN` ignores writes
//!
//! Handles are cheap clones sharing one timer, so a test can keep a handle
//! while the driver owns another.

use crate::gpt::{self, tctl, tstat, ClockSource};
use hal::mmio::{check_byte_access, check_word_access};
use hal::{MmioError, RegisterIo};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const REGISTER_COUNT: usize = gpt::WINDOW_LEN / 4;
const WRAP: u64 = 1 << 32;

#[derive(Debug)]
struct GptState {
    registers: [u32; REGISTER_COUNT],
    /// Captured writes: (offset, value)
    writes: Vec<(usize, u32)>,
    /// Offsets whose next access fails
    fail_once: BTreeSet<usize>,
    /// Offsets whose accesses always fail
    fail_always: BTreeSet<usize>,
    /// Delay inserted after a read has sampled its value
    read_latency: BTreeMap<usize, Duration>,
    /// Number of compare events since creation
    compare_events: u64,
}

impl GptState {
    fn new() -> Self {
        let mut registers = [0; REGISTER_COUNT];
        registers[gpt::TCMP / 4] = u32::MAX;
        Self {
            registers,
            writes: Vec::new(),
            fail_once: BTreeSet::new(),
            fail_always: BTreeSet::new(),
            read_latency: BTreeMap::new(),
            compare_events: 0,
        }
    }

    fn reg(&self, offset: usize) -> u32 {
        self.registers[offset / 4]
    }

    fn reg_mut(&mut self, offset: usize) -> &mut u32 {
        &mut self.registers[offset / 4]
    }

    fn check_fault(&mut self, offset: usize) -> Result<(), MmioError> {
        if self.fail_always.contains(&offset) || self.fail_once.remove(&offset) {
            return Err(MmioError::Bus(offset));
        }
        Ok(())
    }

    fn latch_compare(&mut self) {
        if tctl::COMP_EN.is_set(self.reg(gpt::TCTL)) {
            *self.reg_mut(gpt::TSTAT) |= tstat::COMP.mask();
        }
        self.compare_events += 1;
    }

    fn pulse(&mut self, pulses: u64) {
        let control = self.reg(gpt::TCTL);
        let source = ClockSource::from_bits(tctl::CLKSOURCE.extract(control));
        if !tctl::TEN.is_set(control) || source != Some(ClockSource::Tin) || pulses == 0 {
            return;
        }

        let count = u64::from(self.reg(gpt::TCN));
        let compare = u64::from(self.reg(gpt::TCMP));

        if tctl::FRR.is_set(control) {
            let mut distance = (compare + WRAP - count) % WRAP;
            if distance == 0 {
                distance = WRAP;
            }
            if pulses >= distance {
                self.latch_compare();
            }
            *self.reg_mut(gpt::TCN) = ((count + pulses) % WRAP) as u32;
        } else {
            let period = compare + 1;
            let next = count + pulses;
            if next >= period {
                self.latch_compare();
            }
            *self.reg_mut(gpt::TCN) = (next % period) as u32;
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        match offset {
            gpt::TCTL => {
                let previous = self.reg(gpt::TCTL);
                let stopping = tctl::TEN.is_set(previous) && !tctl::TEN.is_set(value);
                if stopping && tctl::CC.is_set(value) {
                    *self.reg_mut(gpt::TCN) = 0;
                }
                *self.reg_mut(gpt::TCTL) = value;
            }
            gpt::TSTAT => *self.reg_mut(gpt::TSTAT) &= !value,
            gpt::TCN => {}
            _ => *self.reg_mut(offset) = value,
        }
    }
}

/// Simulated GPT instance
///
/// # Examples
///
/// ```
/// use hal::RegisterIo;
/// use hal_imx27::gpt::{self, tctl};
/// use hal_imx27::SimGpt;
///
/// let mut timer = SimGpt::new();
/// timer.set_field(gpt::TCTL, tctl::CLKSOURCE, 3).unwrap();
/// timer.set_field(gpt::TCTL, tctl::TEN, 1).unwrap();
///
/// timer.pulse(42);
/// assert_eq!(timer.read32(gpt::TCN).unwrap(), 42);
/// ```
#[derive(Debug, Clone)]
pub struct SimGpt {
    state: Arc<Mutex<GptState>>,
}

impl SimGpt {
    /// Creates a timer in its reset state (disabled, compare at maximum)
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GptState::new())),
        }
    }

    fn state(&self) -> MutexGuard<'_, GptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feeds external pulses on the TIN pad
    pub fn pulse(&self, pulses: u64) {
        self.state().pulse(pulses);
    }

    /// Sets the counter directly (test shortcut for long pulse trains)
    pub fn preload_count(&self, count: u32) {
        *self.state().reg_mut(gpt::TCN) = count;
    }

    /// Returns the current counter value
    pub fn count(&self) -> u32 {
        self.state().reg(gpt::TCN)
    }

    /// Returns the raw value of a register without side effects
    pub fn register(&self, offset: usize) -> u32 {
        self.state().reg(offset)
    }

    /// Returns true if the compare flag is latched
    pub fn compare_pending(&self) -> bool {
        tstat::COMP.is_set(self.state().reg(gpt::TSTAT))
    }

    /// Returns the number of compare events since creation
    pub fn compare_events(&self) -> u64 {
        self.state().compare_events
    }

    /// Returns all captured writes in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state().writes.clone()
    }

    /// Clears the captured writes
    pub fn clear_writes(&self) {
        self.state().writes.clear();
    }

    /// Makes the next access to `offset` fail with a bus error
    pub fn fail_next(&self, offset: usize) {
        self.state().fail_once.insert(offset);
    }

    /// Makes every access to `offset` fail until [`SimGpt::heal`]
    pub fn fail_always(&self, offset: usize) {
        self.state().fail_always.insert(offset);
    }

    /// Removes every injected failure
    pub fn heal(&self) {
        let mut state = self.state();
        state.fail_once.clear();
        state.fail_always.clear();
    }

    /// Delays every read of `offset` after its value was sampled
    ///
    /// Widens the window between a read and the caller's next access, which
    /// lets tests provoke interleavings between concurrent callers.
    pub fn set_read_latency(&self, offset: usize, latency: Duration) {
        self.state().read_latency.insert(offset, latency);
    }
}

impl Default for SimGpt {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterIo for SimGpt {
    fn len(&self) -> usize {
        gpt::WINDOW_LEN
    }

    fn read32(&mut self, offset: usize) -> Result<u32, MmioError> {
        check_word_access(offset, gpt::WINDOW_LEN)?;
        let (value, latency) = {
            let mut state = self.state();
            state.check_fault(offset)?;
            (state.reg(offset), state.read_latency.get(&offset).copied())
        };
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }
        Ok(value)
    }

    fn write32(&mut self, offset: usize, value: u32) -> Result<(), MmioError> {
        check_word_access(offset, gpt::WINDOW_LEN)?;
        let mut state = self.state();
        state.check_fault(offset)?;
        state.writes.push((offset, value));
        state.write(offset, value);
        Ok(())
    }

    fn read8(&mut self, offset: usize) -> Result<u8, MmioError> {
        check_byte_access(offset, gpt::WINDOW_LEN)?;
        let word = self.read32(offset & !3)?;
        Ok((word >> ((offset % 4) * 8)) as u8)
    }
}
