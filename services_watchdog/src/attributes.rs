//! Attribute group `watchdog`

use crate::Watchdog;
use hal::{DelayHal, GpioLine, TimerDevice};
use monitor_types::{is_trigger, parse_int, Attribute, AttributeError, AttributeGroup};

/// Name of the attribute group
pub const GROUP_NAME: &str = "watchdog";

const ATTRIBUTES: [Attribute; 4] = [
    Attribute::read_only("inhib"),
    Attribute::read_only("clock"),
    Attribute::read_only("remaining_time"),
    Attribute::write_only("trig"),
];

impl<G: GpioLine, T: TimerDevice, D: DelayHal> AttributeGroup for Watchdog<G, T, D> {
    fn name(&self) -> &str {
        GROUP_NAME
    }

    fn attributes(&self) -> &[Attribute] {
        &ATTRIBUTES
    }

    fn show(&self, attribute: &str) -> Result<String, AttributeError> {
        self.check_readable(attribute)?;
        match attribute {
            "inhib" => Ok(format!("{}\n", u8::from(self.poll_inhibit()?))),
            "clock" => Ok(format!("{}\n", u8::from(self.poll_clock()?))),
            "remaining_time" => Ok(format!("{}\n", self.poll_remaining()?)),
            _ => Err(AttributeError::NotFound(attribute.to_string())),
        }
    }

    fn store(&self, attribute: &str, input: &str) -> Result<usize, AttributeError> {
        self.check_writable(attribute)?;
        match attribute {
            "trig" => {
                if is_trigger(parse_int(input)?) {
                    self.rearm()?;
                }
                Ok(input.len())
            }
            _ => Err(AttributeError::NotFound(attribute.to_string())),
        }
    }
}
