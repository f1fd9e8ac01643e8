//! Bus and chip-select collaborators
//!
//! The command layer never talks to hardware directly. Instead it is handed
//! a [`SpiBus`] for data transfer and a [`GpioOutput`] that drives the chip
//! select line, so the same commands run against a real controller, an
//! embedded-hal peripheral or an in-memory emulator.

mod cs;
mod traits;

pub use cs::{assert, deassert, ChipSelect, Selected};
#[cfg(feature = "std")]
pub use traits::StdDelay;
pub use traits::{BusError, Delay, GpioOutput, PinLevel, SpiBus};
