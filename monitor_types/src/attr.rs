//! # Attributes
//!
//! A monitor publishes a group of named text attributes. Reading an
//! attribute renders the current state; writing one parses the input and
//! may act on the hardware.
//!
//! ## Design
//!
//! Attributes are either read-only or write-only, matching the access modes
//! the monitors actually use. Input parsing follows the kernel's `kstrtoint`
//! in base 10 so that `echo 1 > reset` keeps working.

use thiserror::Error;

/// Access mode of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// May only be shown
    ReadOnly,
    /// May only be stored
    WriteOnly,
}

/// Description of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, unique within its group
    pub name: &'static str,
    /// Permitted access
    pub access: Access,
}

impl Attribute {
    /// Describes a read-only attribute
    pub const fn read_only(name: &'static str) -> Self {
        Self {
            name,
            access: Access::ReadOnly,
        }
    }

    /// Describes a write-only attribute
    pub const fn write_only(name: &'static str) -> Self {
        Self {
            name,
            access: Access::WriteOnly,
        }
    }

    /// Returns true if the attribute may be shown
    pub fn is_readable(&self) -> bool {
        self.access == Access::ReadOnly
    }

    /// Returns true if the attribute may be stored
    pub fn is_writable(&self) -> bool {
        self.access == Access::WriteOnly
    }
}

/// Errors from integer input parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseIntError {
    /// Empty input or a character that is not a decimal digit
    #[error("Invalid integer")]
    Invalid,

    /// The value does not fit in an `i32`
    #[error("Integer out of range")]
    OutOfRange,
}

/// Errors returned through the attribute transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The group has no attribute with this name
    #[error("No attribute named {0}")]
    NotFound(String),

    /// The attribute does not permit the requested access
    #[error("Permission denied on attribute {0}")]
    PermissionDenied(String),

    /// The written input could not be parsed
    #[error("Invalid input: {0}")]
    Parse(#[from] ParseIntError),

    /// The monitor failed to access its hardware
    #[error("Device error: {0}")]
    Device(String),
}

/// A named group of attributes published by one monitor
///
/// Methods take `&self`: monitors serialize hardware access internally, so
/// a group can be shared between threads.
pub trait AttributeGroup {
    /// Returns the group name
    fn name(&self) -> &str;

    /// Returns the attributes of the group
    fn attributes(&self) -> &[Attribute];

    /// Renders the current value of an attribute
    fn show(&self, attribute: &str) -> Result<String, AttributeError>;

    /// Writes an attribute, returning the number of input bytes consumed
    fn store(&self, attribute: &str, input: &str) -> Result<usize, AttributeError>;

    /// Looks up an attribute by name
    fn attribute(&self, name: &str) -> Result<Attribute, AttributeError> {
        self.attributes()
            .iter()
            .find(|attribute| attribute.name == name)
            .copied()
            .ok_or_else(|| AttributeError::NotFound(name.to_string()))
    }

    /// Fails unless `name` exists and is readable
    fn check_readable(&self, name: &str) -> Result<(), AttributeError> {
        if self.attribute(name)?.is_readable() {
            Ok(())
        } else {
            Err(AttributeError::PermissionDenied(name.to_string()))
        }
    }

    /// Fails unless `name` exists and is writable
    fn check_writable(&self, name: &str) -> Result<(), AttributeError> {
        if self.attribute(name)?.is_writable() {
            Ok(())
        } else {
            Err(AttributeError::PermissionDenied(name.to_string()))
        }
    }
}

/// Parses a base 10 integer the way `kstrtoint` does
///
/// Accepts an optional sign, at least one decimal digit and at most one
/// trailing newline. Nothing else is allowed, not even spaces.
///
/// # Examples
///
/// ```
/// use monitor_types::{parse_int, ParseIntError};
///
/// assert_eq!(parse_int("1\n"), Ok(1));
/// assert_eq!(parse_int("-49"), Ok(-49));
/// assert_eq!(parse_int("abc"), Err(ParseIntError::Invalid));
/// ```
pub fn parse_int(input: &str) -> Result<i32, ParseIntError> {
    let body = input.strip_suffix('\n').unwrap_or(input);
    let (negative, digits) = match body.as_bytes().first() {
        Some(b'-') => (true, &body[1..]),
        Some(b'+') => (false, &body[1..]),
        _ => (false, body),
    };
    if digits.is_empty() {
        return Err(ParseIntError::Invalid);
    }

    let mut magnitude: i64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            return Err(ParseIntError::Invalid);
        }
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(i64::from(byte - b'0')))
            .ok_or(ParseIntError::OutOfRange)?;
    }

    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).map_err(|_| ParseIntError::OutOfRange)
}

/// Returns true if a written integer requests an action
///
/// Both the number `1` and the character code of `'1'` are accepted.
pub fn is_trigger(value: i32) -> bool {
    value == 1 || value == i32::from(b'1')
}
