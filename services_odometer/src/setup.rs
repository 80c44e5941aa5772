//! # Timer configuration
//!
//! The GPT is programmed once, when the channel is created, by replaying a
//! fixed list of field writes. The list is data so that it can be inspected
//! and tested on its own.
//!
//! After the sequence the timer counts TIN pulses undivided, restarts at
//! zero after reaching `0xFFFF_FFFF` and latches the compare flag on every
//! restart.

use hal::{MmioError, RegisterField, RegisterIo};
use hal_imx27::gpt::{self, tcmp, tctl, tprer, ClockSource};
use log::debug;

/// Lifecycle of a counting channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Nothing has been written to the timer
    Uninitialized,
    /// Programmed, counting disabled
    ///
    /// A reset passes through this state while counting is disabled; a
    /// reset that fails after the disable leaves the channel here.
    Configured,
    /// Counting pulses
    Running,
}

/// One field write of the configuration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupStep {
    /// What the step does
    pub description: &'static str,
    /// Register offset in the GPT window
    pub register: usize,
    /// Field being written
    pub field: RegisterField,
    /// Field value
    pub value: u32,
}

impl SetupStep {
    const fn new(description: &'static str, register: usize, field: RegisterField, value: u32) -> Self {
        Self {
            description,
            register,
            field,
            value,
        }
    }

    /// Performs the step
    pub fn apply<R: RegisterIo>(&self, io: &mut R) -> Result<(), MmioError> {
        debug!("odo: {}", self.description);
        io.set_field(self.register, self.field, self.value)
    }
}

/// Writes that bring a GPT into restart-on-compare pulse counting
///
/// The last step enables counting; everything before it runs with the timer
/// stopped.
pub const CONFIGURE_SEQUENCE: [SetupStep; 8] = [
    SetupStep::new("disable counting", gpt::TCTL, tctl::TEN, 0),
    SetupStep::new("clear counter on disable", gpt::TCTL, tctl::CC, 1),
    SetupStep::new("count TIN pulses", gpt::TCTL, tctl::CLKSOURCE, ClockSource::Tin.bits()),
    SetupStep::new("prescale by 1", gpt::TPRER, tprer::PRESCALER, 0),
    SetupStep::new("enable compare event", gpt::TCTL, tctl::COMP_EN, 1),
    SetupStep::new("restart on compare", gpt::TCTL, tctl::FRR, 0),
    SetupStep::new("compare at maximum", gpt::TCMP, tcmp::COMPARE, u32::MAX),
    SetupStep::new("enable counting", gpt::TCTL, tctl::TEN, 1),
];

/// Runs [`CONFIGURE_SEQUENCE`]
///
/// `state` follows the progress: it becomes `Configured` once every step
/// but the last succeeded and `Running` once counting is enabled. On error
/// it keeps the last state reached.
pub fn configure<R: RegisterIo>(io: &mut R, state: &mut ChannelState) -> Result<(), MmioError> {
    let (enable, program) = match CONFIGURE_SEQUENCE.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };

    for step in program {
        step.apply(io)?;
    }
    *state = ChannelState::Configured;

    enable.apply(io)?;
    *state = ChannelState::Running;
    Ok(())
}
