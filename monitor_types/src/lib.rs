//! # Monitor Types
//!
//! Types shared by every board monitor.
//!
//! ## Philosophy
//!
//! - **One transport model**: every monitor exposes its state as a named
//!   group of text attributes, read with `show` and written with `store`
//! - **Explicit configuration**: platform nodes and module parameters are
//!   plain values handed to a monitor when it is created, never globals
//!
//! ## Modules
//!
//! - [`attr`]: attribute groups, access rules and integer input parsing
//! - [`platform`]: platform configuration nodes and module parameters
//! - [`telemetry`]: read statistics shared by the counter monitors

pub mod attr;
pub mod platform;
pub mod telemetry;

pub use attr::{is_trigger, parse_int, Access, Attribute, AttributeError, AttributeGroup, ParseIntError};
pub use platform::{ConfigError, ModuleParams, OdoNode, PicodoNode, PlatformConfig, WatchdogNode};
pub use telemetry::AccessTelemetry;
