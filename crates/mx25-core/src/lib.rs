//! mx25-core - Command layer for MX25V8035-class SPI NOR flash
//!
//! This crate translates the chip's command set into SPI frames driven over
//! an injected bus and a GPIO chip-select line. It is `no_std` compatible and
//! never allocates unless the `alloc` feature is enabled.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable `Vec`-returning helpers such as `protocol::read_data`
//! - `embedded-hal` - Adapters for embedded-hal 1.0 buses, pins and delays
//!
//! # Example
//!
//! ```ignore
//! use mx25_core::device::DEFAULT_TIMEOUT;
//! use mx25_core::transport::{ChipSelect, GpioOutput, SpiBus};
//! use mx25_core::{protocol, Device, Result};
//!
//! fn dump<B: SpiBus, G: GpioOutput<Port = u32>>(bus: &mut B, gpio: &mut G) -> Result<[u8; 64]> {
//!     let mut dev = Device::new(bus, gpio, ChipSelect::new(0, 8), DEFAULT_TIMEOUT);
//!     protocol::verify_id(&mut dev)?;
//!     let mut buf = [0u8; 64];
//!     protocol::read_into(&mut dev, 0, &mut buf)?;
//!     Ok(buf)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod device;
pub mod error;
#[cfg(feature = "embedded-hal")]
pub mod hal;
pub mod protocol;
pub mod spi;
pub mod transport;

#[cfg(test)]
mod testutils;

pub use device::Device;
pub use error::{Error, ParameterError, Result};
