//! Attribute group `odo`
//!
//! | Attribute     | Access | Value                         |
//! |---------------|--------|-------------------------------|
//! | `counter`     | read   | 64-bit count, decimal         |
//! | `nb_access`   | read   | queries in this epoch         |
//! | `mean_period` | read   | mean query period, `" ms"`    |
//! | `reset`       | write  | `1` or `'1'` resets           |

use crate::Odometer;
use hal::{DelayHal, RegisterIo, TimerDevice};
use monitor_types::{is_trigger, parse_int, Attribute, AttributeError, AttributeGroup};

/// Name of the attribute group
pub const GROUP_NAME: &str = "odo";

const ATTRIBUTES: [Attribute; 4] = [
    Attribute::read_only("counter"),
    Attribute::read_only("nb_access"),
    Attribute::read_only("mean_period"),
    Attribute::write_only("reset"),
];

impl<R: RegisterIo, T: TimerDevice, D: DelayHal> AttributeGroup for Odometer<R, T, D> {
    fn name(&self) -> &str {
        GROUP_NAME
    }

    fn attributes(&self) -> &[Attribute] {
        &ATTRIBUTES
    }

    fn show(&self, attribute: &str) -> Result<String, AttributeError> {
        self.check_readable(attribute)?;
        match attribute {
            "counter" => Ok(format!("{}\n", self.query()?)),
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
