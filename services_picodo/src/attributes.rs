//! Attribute group `odo` of the counter chip
//!
//! Same layout as the timer odometer plus a `version` attribute, so user
//! space reads both boards the same way.

use crate::chip::version_text;
use crate::Picodo;
use hal::{DelayHal, GpioLine, SmbusDevice, TimerDevice};
use monitor_types::{is_trigger, parse_int, Attribute, AttributeError, AttributeGroup};

/// Name of the attribute group
pub const GROUP_NAME: &str = "odo";

const ATTRIBUTES: [Attribute; 5] = [
    Attribute::read_only("counter"),
    Attribute::read_only("version"),
    Attribute::read_only("nb_access"),
    Attribute::read_only("mean_period"),
    Attribute::write_only("reset"),
];

impl<S: SmbusDevice, G: GpioLine, T: TimerDevice, D: DelayHal> AttributeGroup for Picodo<S, G, T, D> {
    fn name(&self) -> &str {
        GROUP_NAME
    }

    fn attributes(&self) -> &[Attribute] {
        &ATTRIBUTES
    }

    fn show(&self, attribute: &str) -> Result<String, AttributeError> {
        self.check_readable(attribute)?;
        match attribute {
            "counter" => Ok(format!("{}\n", self.read_counter()?)),
            "version" => Ok(format!("{}\n", version_text(self.version()))),
            "nb_access" => Ok(format!("{}\n", self.access_count())),
            "mean_period" => Ok(format!("{} ms\n", self.mean_period_ms())),
            _ => Err(AttributeError::NotFound(attribute.to_string())),
        }
    }

    fn store(&self, attribute: &str, input: &str) -> Result<usize, AttributeError> {
        self.check_writable(attribute)?;
        match attribute {
            "reset" => {
                if is_trigger(parse_int(input)?) {
                    self.reset()?;
                }
                Ok(input.len())
            }
            _ => Err(AttributeError::NotFound(attribute.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::REG_CNT;
    use hal_imx27::{FakeGpioLine, FakeSmbus, RecordingDelay, SimClock};
    use monitor_types::ParseIntError;

    fn picodo() -> (Picodo<FakeSmbus, FakeGpioLine, SimClock, RecordingDelay>, FakeSmbus, SimClock) {
        let _ = env_logger::builder().is_test(true).try_init();
        let bus = FakeSmbus::new();
        bus.set_word(crate::REG_VER, u32::from_be_bytes(*b"1.04"));
        bus.set_word(REG_CNT, 4_000_000_000);
        let clock = SimClock::new(100);
        let line = FakeGpioLine::new(40).unwrap();
        let picodo = Picodo::attach(bus.clone(), line, clock.clone(), RecordingDelay::new()).unwrap();
        (picodo, bus, clock)
    }

    #[test]
    fn test_show_attributes() {
        let (picodo, _, clock) = picodo();
        assert_eq!(picodo.show("version").unwrap(), "1.04\n");
        assert_eq!(picodo.show("counter").unwrap(), "4000000000\n");
        clock.advance(50);
        picodo.show("counter").unwrap();
        assert_eq!(picodo.show("nb_access").unwrap(), "2\n");
        assert_eq!(picodo.show("mean_period").unwrap(), "250 ms\n");
    }

    #[test]
    fn test_reset_attribute() {
        let (picodo, _, _) = picodo();
        picodo.show("counter").unwrap();

        assert_eq!(picodo.store("reset", "0\n").unwrap(), 2);
        assert_eq!(picodo.show("nb_access").unwrap(), "1\n");

        assert_eq!(picodo.store("reset", "x"), Err(AttributeError::Parse(ParseIntError::Invalid)));
        assert_eq!(picodo.show("nb_access").unwrap(), "1\n");

        assert_eq!(picodo.store("reset", "1").unwrap(), 1);
        assert_eq!(picodo.show("nb_access").unwrap(), "0\n");
    }

    #[test]
    fn test_bus_failure_is_device_error() {
        let (picodo, bus, _) = picodo();
        bus.fail_next(1);
        assert!(matches!(picodo.show("counter"), Err(AttributeError::Device(_))));
        assert_eq!(picodo.show("counter").unwrap(), "4000000000\n");
    }

    #[test]
    fn test_version_is_read_only() {
        let (picodo, _, _) = picodo();
        assert_eq!(
            picodo.store("version", "1"),
            Err(AttributeError::PermissionDenied("version".to_string()))
        );
    }
}
