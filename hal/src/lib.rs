//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware abstraction traits used by the board
//! monitors.
//!
//! ## Philosophy
//!
//! **Monitors never touch hardware directly.**
//!
//! Every register, bus and pin access goes through a trait defined here.
//! SoC-specific crates implement the traits for real hardware and provide
//! fakes so the monitors can be tested on a host.
//!
//! ## Design Principles
//!
//! 1. **Fallible access**: Every hardware access returns a `Result`
//! 2. **Trait-based**: Monitors are generic over the traits, never over a SoC
//! 3. **Minimal unsafe**: Raw pointer access lives only in the SoC crate
//! 4. **Testable**: Register fields are pure values that can be checked alone

pub mod delay;
pub mod field;
pub mod gpio;
pub mod mmio;
pub mod smbus;
pub mod timer;

pub use delay::DelayHal;
pub use field::RegisterField;
pub use gpio::{GpioError, GpioLine};
pub use mmio::{MmioError, MmioMapper, RegisterIo};
pub use smbus::{SmbusDevice, SmbusError};
pub use timer::TimerDevice;
