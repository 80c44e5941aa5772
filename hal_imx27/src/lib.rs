//! # i.MX27 Hardware Abstraction Layer
//!
//! This crate implements the HAL traits for the Freescale i.MX27 SoC found
//! on the Thelma7 baseboard.
//!
//! ## Scope
//!
//! - The physical memory map and the General Purpose Timer register layout
//! - [`RealMmio`]: volatile access to an already mapped register window
//! - Host-side doubles for every HAL trait so the monitors can be tested
//!   without the board: [`FakePhysicalMemory`], [`SimGpt`], [`SimClock`],
//!   [`FakeTimerDevice`], [`RecordingDelay`], [`FakeGpioLine`], [`FakeSmbus`]
//! - [`JiffiesClock`] and [`ThreadDelay`] for hosted builds

pub mod delay;
pub mod gpio;
pub mod gpt;
pub mod gpt_sim;
pub mod memory_map;
pub mod mmio;
pub mod smbus;
pub mod timer;

pub use delay::{RecordingDelay, ThreadDelay};
pub use gpio::{Direction, FakeGpioLine, GpioEvent};
pub use gpt_sim::SimGpt;
pub use mmio::{FakePhysicalMemory, FakeRegion, RealMmio};
pub use smbus::FakeSmbus;
pub use timer::{FakeTimerDevice, JiffiesClock, SimClock};
