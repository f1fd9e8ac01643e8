//! Chip-select control

use super::{GpioOutput, PinLevel};

/// The GPIO line that gates bus access to one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSelect<P> {
    /// GPIO port of the chip select line
    pub port: P,
    /// Pin number within `port`
    pub pin: u32,
}

impl<P> ChipSelect<P> {
    /// Create a chip select description
    pub const fn new(port: P, pin: u32) -> Self {
        Self { port, pin }
    }
}

/// Select the chip (chip select is active low)
pub fn assert<G: GpioOutput + ?Sized>(gpio: &mut G, port: G::Port, pin: u32) {
    gpio.set(port, pin, PinLevel::Low);
}

/// Release the chip and the bus
pub fn deassert<G: GpioOutput + ?Sized>(gpio: &mut G, port: G::Port, pin: u32) {
    gpio.set(port, pin, PinLevel::High);
}

/// Chip select held asserted for the lifetime of the guard
///
/// The line is deasserted when the guard is dropped, so every exit path of a
/// transaction releases the chip, including early returns on bus errors.
pub struct Selected<'a, G: GpioOutput + ?Sized> {
    gpio: &'a mut G,
    cs: ChipSelect<G::Port>,
}

impl<'a, G: GpioOutput + ?Sized> Selected<'a, G> {
    /// Assert chip select and return the guard that releases it
    pub fn new(gpio: &'a mut G, cs: ChipSelect<G::Port>) -> Self {
        assert(gpio, cs.port, cs.pin);
        Self { gpio, cs }
    }
}

impl<G: GpioOutput + ?Sized> Drop for Selected<'_, G> {
    fn drop(&mut self) {
        deassert(self.gpio, self.cs.port, self.cs.pin);
    }
}
