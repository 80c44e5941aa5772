//! Counter chip protocol

use crate::PicodoError;
use hal::{DelayHal, GpioLine, SmbusDevice, SmbusError};
use log::error;

/// Pulse count register
pub const REG_CNT: u8 = 0x0;
/// Firmware version register
pub const REG_VER: u8 = 0x4;

/// Time the reset line is held low
pub const RESET_HOLD_MS: u32 = 10;
/// Time the chip needs after reset before answering
pub const RESET_SETTLE_MS: u32 = 10;

/// Reads a 32-bit register as four byte reads, least significant first
pub fn read_register<S: SmbusDevice>(bus: &mut S, register: u8) -> Result<u32, SmbusError> {
    let mut value = 0u32;
    for byte in 0..4u8 {
        let command = register.wrapping_add(byte);
        let data = bus.read_byte_data(command).map_err(|err| {
            error!("picodo: error reading byte {:#X}", command);
            err
        })?;
        value |= u32::from(data) << (8 * byte);
    }
    Ok(value)
}

/// Pulses the reset line and unlocks register reads
///
/// The result of the unlock read is ignored.
pub fn hardware_reset<S, G, D>(bus: &mut S, reset_line: &mut G, delay: &mut D) -> Result<(), PicodoError>
where
    S: SmbusDevice,
    G: GpioLine,
    D: DelayHal,
{
    if let Err(err) = reset_line.set_output(false) {
        error!("picodo: cannot drive reset GPIO {}: {}", reset_line.number(), err);
        return Err(err.into());
    }
    delay.delay_ms(RESET_HOLD_MS);
    let released = reset_line.set_input();
    delay.delay_ms(RESET_SETTLE_MS);
    let _ = bus.read_byte_data(REG_CNT);
    released.map_err(PicodoError::from)
}

/// Renders a version register as its four characters, most significant
/// byte first
pub fn version_text(version: u32) -> String {
    version.to_be_bytes().iter().map(|&byte| char::from(byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_imx27::{FakeGpioLine, FakeSmbus, GpioEvent, RecordingDelay};

    #[test]
    fn test_read_register_little_endian() {
        let mut bus = FakeSmbus::new();
        bus.set_byte(0, 0x78);
        bus.set_byte(1, 0x56);
        bus.set_byte(2, 0x34);
        bus.set_byte(3, 0x12);
        assert_eq!(read_register(&mut bus, REG_CNT).unwrap(), 0x1234_5678);
        assert_eq!(bus.log(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_read_register_stops_at_first_error() {
        let mut bus = FakeSmbus::new();
        bus.fail_next(1);
        assert_eq!(read_register(&mut bus, REG_VER), Err(SmbusError::Timeout(4)));
        assert_eq!(bus.log(), vec![4]);
    }

    #[test]
    fn test_hardware_reset_sequence() {
        let mut bus = FakeSmbus::new();
        bus.set_offline(true);
        let mut line = FakeGpioLine::new(12).unwrap();
        let mut delay = RecordingDelay::new();

        // The unlock read fails and is ignored
        hardware_reset(&mut bus, &mut line, &mut delay).unwrap();
        assert_eq!(line.events(), vec![GpioEvent::Output(false), GpioEvent::Input]);
        assert_eq!(delay.calls(), vec![RESET_HOLD_MS, RESET_SETTLE_MS]);
        assert_eq!(bus.log(), vec![REG_CNT]);
    }

    #[test]
    fn test_hardware_reset_gpio_failure() {
        let mut bus = FakeSmbus::new();
        let mut line = FakeGpioLine::new(12).unwrap();
        line.set_failing(true);
        let mut delay = RecordingDelay::new();

        assert!(hardware_reset(&mut bus, &mut line, &mut delay).is_err());
        assert!(delay.calls().is_empty());
        assert!(bus.log().is_empty());
    }

    #[test]
    fn test_version_text() {
        assert_eq!(version_text(u32::from_be_bytes(*b"P107")), "P107");
    }
}
