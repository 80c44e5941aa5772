//! # Timer Odometer Service
//!
//! Turns one i.MX27 General Purpose Timer into a 64-bit pulse odometer with
//! read telemetry.
//!
//! ## Philosophy
//!
//! - **Hardware counts, software extends**: the GPT counts TIN pulses in 32
//!   bits and flags each wrap; the service folds the flags into a high word
//! - **One owner**: an [`Odometer`] owns its register window, clock and delay;
//!   there is no global instance
//! - **One lock**: every query and reset runs under the channel lock, so a
//!   wrap is never counted twice and telemetry matches the values returned
//! - **Testable**: all hardware is behind HAL traits and runs against
//!   [`hal_imx27::SimGpt`] in tests
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --configure--> Configured --enable--> Running
//!                                                        |
//!                                  Running <--reset------+
//! ```
//!
//! ## Example
//!
//! ```
//! use hal_imx27::{RecordingDelay, SimClock, SimGpt};
//! use services_odometer::{Odometer, ResolvedChannel};
//!
//! let timer = SimGpt::new();
//! let channel = ResolvedChannel::for_gpt(2).unwrap();
//! let odometer = Odometer::new(channel, timer.clone(), SimClock::new(100), RecordingDelay::new()).unwrap();
//!
//! timer.pulse(1500);
//! assert_eq!(odometer.query().unwrap(), 1500);
//! assert_eq!(odometer.access_count(), 1);
//! ```

pub mod attributes;
pub mod config;
pub mod counter;
pub mod error;
pub mod guard;
pub mod setup;

pub use config::{resolve_channel, ResolvedChannel, USABLE_GPTS};
pub use counter::ExtendedCounter;
pub use error::OdometerError;
pub use guard::PollGuard;
pub use monitor_types::AccessTelemetry;
pub use setup::{configure, ChannelState, SetupStep, CONFIGURE_SEQUENCE};

use hal::{DelayHal, MmioError, MmioMapper, RegisterIo, TimerDevice};
use hal_imx27::gpt::{self, tctl, tstat};
use log::{error, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Time the timer stays disabled during a reset
pub const RESET_SETTLE_MS: u32 = 10;

/// Label of the claimed register window
pub const REGION_LABEL: &str = "odo";

struct Channel<R, T, D> {
    io: R,
    clock: T,
    delay: D,
    state: ChannelState,
    counter: ExtendedCounter,
    telemetry: AccessTelemetry,
    guard: PollGuard,
}

impl<R: RegisterIo, T: TimerDevice, D: DelayHal> Channel<R, T, D> {
    fn query(&mut self) -> Result<u64, MmioError> {
        let value = self.counter.query(&mut self.io)?;
        let now = self.clock.poll_ticks();
        self.guard.observe(self.telemetry.last_access(), now);
        self.telemetry.record_access(now);
        Ok(value)
    }

    fn reset(&mut self) -> Result<(), MmioError> {
        // CC is set, so disabling clears the hardware count
        self.io.set_field(gpt::TCTL, tctl::TEN, 0)?;
        self.state = ChannelState::Configured;
        self.counter.clear();
        self.telemetry.clear();
        self.io.write32(gpt::TSTAT, tstat::COMP.mask())?;

        self.delay.delay_ms(RESET_SETTLE_MS);

        self.io.set_field(gpt::TCTL, tctl::TEN, 1)?;
        self.state = ChannelState::Running;
        Ok(())
    }
}

/// A GPT-based odometer
///
/// Safe to share between threads (for instance behind an `Arc`) when the
/// register window, clock and delay are `Send`.
pub struct Odometer<R, T, D> {
    resolved: ResolvedChannel,
    tick_hz: u64,
    channel: Mutex<Channel<R, T, D>>,
}

impl<R: RegisterIo, T: TimerDevice, D: DelayHal> Odometer<R, T, D> {
    /// Creates an odometer over an already mapped register window
    ///
    /// Programs the timer with [`CONFIGURE_SEQUENCE`]; counting is running
    /// when this returns.
    pub fn new(resolved: ResolvedChannel, mut io: R, clock: T, delay: D) -> Result<Self, OdometerError> {
        let mut state = ChannelState::Uninitialized;
        if let Err(err) = configure(&mut io, &mut state) {
            error!("odo: failed to configure GPT{}: {}", resolved.gpt_id, err);
            return Err(err.into());
        }

        let tick_hz = clock.tick_hz();
        info!(
            "odo: counting TIN pulses (GPIO {}) on GPT{} at {:#010x}",
            resolved.tin_gpio, resolved.gpt_id, resolved.phys_base
        );

        Ok(Self {
            resolved,
            tick_hz,
            channel: Mutex::new(Channel {
                io,
                clock,
                delay,
                state,
                counter: ExtendedCounter::new(),
                telemetry: AccessTelemetry::new(),
                guard: PollGuard::new(resolved.max_pulse_hz, tick_hz),
            }),
        })
    }

    /// Claims and maps the channel's register window, then creates the
    /// odometer over it
    ///
    /// The window stays claimed until the odometer is dropped.
    pub fn attach<M>(mapper: &mut M, resolved: ResolvedChannel, clock: T, delay: D) -> Result<Self, OdometerError>
    where
        M: MmioMapper<Region = R>,
    {
        let io = mapper
            .map(resolved.phys_base, resolved.window_len, REGION_LABEL)
            .map_err(|err| {
                error!("odo: cannot map GPT{} at {:#010x}: {}", resolved.gpt_id, resolved.phys_base, err);
                err
            })?;
        Self::new(resolved, io, clock, delay)
    }

    fn channel(&self) -> MutexGuard<'_, Channel<R, T, D>> {
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the resolved channel
    pub fn resolved(&self) -> ResolvedChannel {
        self.resolved
    }

    /// Returns the rate of the telemetry clock
    pub fn tick_hz(&self) -> u64 {
        self.tick_hz
    }

    /// Returns the channel state
    pub fn state(&self) -> ChannelState {
        self.channel().state
    }

    /// Reads the 64-bit pulse count and records the access
    ///
    /// Telemetry is only updated when every register access succeeded.
    pub fn query(&self) -> Result<u64, OdometerError> {
        self.channel().query().map_err(|err| {
            error!("odo: GPT{} read failed: {}", self.resolved.gpt_id, err);
            err.into()
        })
    }

    /// Restarts counting from zero and starts a new telemetry epoch
    ///
    /// Holds the channel lock for the whole sequence, settle delay included.
    pub fn reset(&self) -> Result<(), OdometerError> {
        self.channel().reset().map_err(|err| {
            error!("odo: GPT{} reset failed: {}", self.resolved.gpt_id, err);
            OdometerError::from(err)
        })?;
        info!("odo: counter reset");
        Ok(())
    }

    /// Returns the number of successful queries in this epoch
    pub fn access_count(&self) -> u64 {
        self.channel().telemetry.access_count()
    }

    /// Returns the mean time between queries in milliseconds
    pub fn mean_period_ms(&self) -> u64 {
        self.channel().telemetry.mean_period_ms(self.tick_hz)
    }

    /// Returns a snapshot of the telemetry
    pub fn telemetry(&self) -> AccessTelemetry {
        self.channel().telemetry
    }

    /// Returns the software high word
    pub fn high_word(&self) -> u32 {
        self.channel().counter.high_word()
    }

    /// Returns how many query gaps exceeded the wrap period
    pub fn missed_poll_windows(&self) -> u64 {
        self.channel().guard.missed()
    }
}
