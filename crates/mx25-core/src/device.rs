//! Device handle
//!
//! A [`Device`] bundles everything a command needs to reach one chip: the
//! borrowed bus, the borrowed GPIO controller, the chip select line and the
//! per-transfer timeout.

use core::time::Duration;

use crate::error::Result;
use crate::transport::{ChipSelect, GpioOutput, Selected, SpiBus};

/// Default timeout applied to every transmit/receive call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

/// Handle to one MX25 chip on a shared bus
///
/// The handle only borrows the bus and GPIO controller; its configuration
/// cannot be changed once built.
pub struct Device<'a, B: SpiBus + ?Sized, G: GpioOutput + ?Sized> {
    bus: &'a mut B,
    gpio: &'a mut G,
    cs: ChipSelect<G::Port>,
    timeout: Duration,
    write_enable_before_read: bool,
}

impl<'a, B: SpiBus + ?Sized, G: GpioOutput + ?Sized> Device<'a, B, G> {
    /// Create a handle for the chip selected by `cs`
    ///
    /// # Arguments
    /// * `bus` - SPI transport the chip is attached to
    /// * `gpio` - GPIO controller owning the chip select line
    /// * `cs` - Chip select port and pin
    /// * `timeout` - Upper bound for each transmit/receive call
    pub fn new(bus: &'a mut B, gpio: &'a mut G, cs: ChipSelect<G::Port>, timeout: Duration) -> Self {
        Self {
            bus,
            gpio,
            cs,
            timeout,
            write_enable_before_read: false,
        }
    }

    /// Issue a write-enable handshake before every read
    ///
    /// Reads do not need the latch. This reproduces the behaviour of firmware
    /// that always sent WREN ahead of READ, for setups that depend on the
    /// extra status round-trip.
    pub fn with_write_enable_before_read(mut self, enabled: bool) -> Self {
        self.write_enable_before_read = enabled;
        self
    }

    /// Chip select line of this chip
    pub fn chip_select(&self) -> ChipSelect<G::Port> {
        self.cs
    }

    /// Timeout applied to every transmit/receive call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether reads are preceded by a write-enable handshake
    pub fn write_enable_before_read(&self) -> bool {
        self.write_enable_before_read
    }

    /// Run `f` inside one chip select window
    ///
    /// Chip select is asserted before `f` runs and deasserted after it
    /// returns, whatever the outcome.
    pub(crate) fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut B, Duration) -> Result<T>,
    ) -> Result<T> {
        let _selected = Selected::new(&mut *self.gpio, self.cs);
        f(&mut *self.bus, self.timeout)
    }
}
