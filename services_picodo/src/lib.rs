//! # I2C Odometer Service
//!
//! Reads the pulse count of the PIC-based counter chip fitted on some
//! Thelma7 baseboards.
//!
//! ## Design
//!
//! The chip exposes little-endian 32-bit registers as runs of four SMBus
//! byte registers. Its firmware only answers register reads after a dummy
//! read following each hardware reset, so [`Picodo`] always performs that
//! read when it pulses the reset line.
//!
//! A failed counter read resets the chip and starts a new telemetry epoch:
//! after a bus error the chip state is unknown.

pub mod attributes;
pub mod chip;
pub mod error;

pub use chip::{read_register, REG_CNT, REG_VER, RESET_HOLD_MS, RESET_SETTLE_MS};
pub use error::PicodoError;

use hal::{DelayHal, GpioLine, SmbusDevice, TimerDevice};
use hal_imx27::memory_map;
use log::{error, info, warn};
use monitor_types::{AccessTelemetry, ConfigError, PlatformConfig};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Resolves and validates the reset GPIO of the chip
pub fn resolve_reset_gpio(platform: &PlatformConfig) -> Result<u32, ConfigError> {
    let gpio = platform.require_picodo()?.gpio_reset;
    if !memory_map::is_valid_gpio(gpio) {
        return Err(ConfigError::InvalidGpio {
            role: "gpio-reset",
            gpio,
        });
    }
    Ok(gpio)
}

struct ChipState<S, G, T, D> {
    bus: S,
    reset_line: G,
    clock: T,
    delay: D,
    telemetry: AccessTelemetry,
}

impl<S: SmbusDevice, G: GpioLine, T: TimerDevice, D: DelayHal> ChipState<S, G, T, D> {
    fn hardware_reset(&mut self) -> Result<(), PicodoError> {
        chip::hardware_reset(&mut self.bus, &mut self.reset_line, &mut self.delay)
    }

    fn read_counter(&mut self) -> Result<u32, PicodoError> {
        match read_register(&mut self.bus, REG_CNT) {
            Ok(count) => {
                let now = self.clock.poll_ticks();
                self.telemetry.record_access(now);
                Ok(count)
            }
            Err(err) => {
                warn!("picodo: counter read failed ({}), resetting chip", err);
                if let Err(reset_err) = self.hardware_reset() {
                    error!("picodo: chip reset failed: {}", reset_err);
                }
                self.telemetry.clear();
                Err(err.into())
            }
        }
    }
}

/// The I2C counter chip
pub struct Picodo<S, G, T, D> {
    version: u32,
    tick_hz: u64,
    chip: Mutex<ChipState<S, G, T, D>>,
}

impl<S: SmbusDevice, G: GpioLine, T: TimerDevice, D: DelayHal> Picodo<S, G, T, D> {
    /// Takes control of the chip
    ///
    /// Releases the reset line, reads the firmware version (a failure is
    /// logged and leaves version 0) and resets the chip once.
    pub fn attach(mut bus: S, mut reset_line: G, clock: T, delay: D) -> Result<Self, PicodoError> {
        if let Err(err) = reset_line.set_input() {
            error!("picodo: cannot reserve reset GPIO {}: {}", reset_line.number(), err);
            return Err(err.into());
        }

        let version = match read_register(&mut bus, REG_VER) {
            Ok(version) => version,
            Err(err) => {
                warn!("picodo: cannot read firmware version: {}", err);
                0
            }
        };

        let tick_hz = clock.tick_hz();
        let mut state = ChipState {
            bus,
            reset_line,
            clock,
            delay,
            telemetry: AccessTelemetry::new(),
        };
        if let Err(err) = state.hardware_reset() {
            warn!("picodo: initial reset failed: {}", err);
        }

        info!("picodo: counter chip firmware {}", chip::version_text(version));
        Ok(Self {
            version,
            tick_hz,
            chip: Mutex::new(state),
        })
    }

    fn chip(&self) -> MutexGuard<'_, ChipState<S, G, T, D>> {
        self.chip.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the firmware version read at attach
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Reads the pulse count and records the access
    pub fn read_counter(&self) -> Result<u32, PicodoError> {
        self.chip().read_counter()
    }

    /// Resets the chip and starts a new telemetry epoch
    pub fn reset(&self) -> Result<(), PicodoError> {
        let mut chip = self.chip();
        chip.telemetry.clear();
        chip.hardware_reset()
    }

    /// Returns the number of successful reads in this epoch
    pub fn access_count(&self) -> u64 {
        self.chip().telemetry.access_count()
    }

    /// Returns the mean time between reads in milliseconds
    pub fn mean_period_ms(&self) -> u64 {
        self.chip().telemetry.mean_period_ms(self.tick_hz)
    }

    /// Returns a snapshot of the telemetry
    pub fn telemetry(&self) -> AccessTelemetry {
        self.chip().telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::GpioError;
    use hal_imx27::{FakeGpioLine, FakeSmbus, GpioEvent, RecordingDelay, SimClock};
    use monitor_types::PicodoNode;

    type FakePicodo = Picodo<FakeSmbus, FakeGpioLine, SimClock, RecordingDelay>;

    fn picodo() -> (FakePicodo, FakeSmbus, FakeGpioLine, SimClock) {
        let _ = env_logger::builder().is_test(true).try_init();
        let bus = FakeSmbus::new();
        bus.set_word(REG_VER, u32::from_be_bytes(*b"V1.2"));
        let line = FakeGpioLine::new(12).unwrap();
        let clock = SimClock::new(100);
        let picodo = Picodo::attach(bus.clone(), line.clone(), clock.clone(), RecordingDelay::new()).unwrap();
        (picodo, bus, line, clock)
    }

    #[test]
    fn test_resolve_reset_gpio() {
        let mut platform = PlatformConfig::default();
        assert_eq!(resolve_reset_gpio(&platform), Err(ConfigError::MissingNode("picodo")));

        platform.picodo = Some(PicodoNode { gpio_reset: 12 });
        assert_eq!(resolve_reset_gpio(&platform), Ok(12));

        platform.picodo = Some(PicodoNode { gpio_reset: 500 });
        assert_eq!(
            resolve_reset_gpio(&platform),
            Err(ConfigError::InvalidGpio {
                role: "gpio-reset",
                gpio: 500
            })
        );
    }

    #[test]
    fn test_attach_reads_version_and_resets() {
        let (picodo, bus, line, _) = picodo();
        assert_eq!(picodo.version(), u32::from_be_bytes(*b"V1.2"));
        assert_eq!(picodo.access_count(), 0);
        assert_eq!(
            line.events(),
            vec![GpioEvent::Input, GpioEvent::Output(false), GpioEvent::Input]
        );
        // Version bytes, then the unlock read
        assert_eq!(bus.log(), vec![4, 5, 6, 7, REG_CNT]);
    }

    #[test]
    fn test_attach_without_version() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bus = FakeSmbus::new();
        bus.fail_next(1);
        let line = FakeGpioLine::new(12).unwrap();
        let picodo = Picodo::attach(bus, line, SimClock::new(100), RecordingDelay::new()).unwrap();
        assert_eq!(picodo.version(), 0);
    }

    #[test]
    fn test_attach_fails_without_reset_line() {
        let line = FakeGpioLine::new(12).unwrap();
        line.set_failing(true);
        let result = Picodo::attach(FakeSmbus::new(), line, SimClock::new(100), RecordingDelay::new());
        assert!(matches!(result, Err(PicodoError::Gpio(GpioError::Access(12)))));
    }

    #[test]
    fn test_read_counter_records_access() {
        let (picodo, bus, _, clock) = picodo();
        bus.set_word(REG_CNT, 123_456);
        assert_eq!(picodo.read_counter().unwrap(), 123_456);
        clock.advance(300);
        assert_eq!(picodo.read_counter().unwrap(), 123_456);
        assert_eq!(picodo.access_count(), 2);
        assert_eq!(picodo.mean_period_ms(), 1500);
    }

    #[test]
    fn test_failed_read_resets_chip_and_epoch() {
        let (picodo, bus, line, clock) = picodo();
        bus.set_word(REG_CNT, 10);
        picodo.read_counter().unwrap();
        clock.advance(100);
        picodo.read_counter().unwrap();
        assert_eq!(picodo.access_count(), 2);

        let resets_before = line.events().len();
        bus.fail_next(1);
        assert!(matches!(picodo.read_counter(), Err(PicodoError::Bus(_))));
        assert_eq!(picodo.telemetry(), AccessTelemetry::new());
        assert_eq!(line.events().len(), resets_before + 2);

        assert_eq!(picodo.read_counter().unwrap(), 10);
        assert_eq!(picodo.access_count(), 1);
    }

    #[test]
    fn test_reset_clears_telemetry() {
        let (picodo, _, line, _) = picodo();
        picodo.read_counter().unwrap();
        picodo.reset().unwrap();
        assert_eq!(picodo.access_count(), 0);
        assert_eq!(line.events().iter().filter(|&&e| e == GpioEvent::Output(false)).count(), 2);
    }
}
