//! embedded-hal 1.0 adapters
//!
//! Wrap a HAL SPI bus, output pin and delay so they can back a [`Device`]:
//!
//! ```ignore
//! let mut bus = HalBus::new(spi);
//! let mut cs = HalCs::new(cs_pin);
//! let mut dev = Device::new(&mut bus, &mut cs, ChipSelect::new((), 0), DEFAULT_TIMEOUT);
//! ```
//!
//! HAL buses bound their own transfers, so the per-call timeout is not
//! forwarded.
//!
//! [`Device`]: crate::Device

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, Error as _};

use crate::transport::{BusError, Delay, GpioOutput, PinLevel, SpiBus};

fn bus_error<E: spi::Error>(err: E) -> BusError {
    log::debug!("mx25: SPI bus error: {:?}", err.kind());
    BusError::Fault
}

/// [`SpiBus`] over an embedded-hal `SpiBus<u8>`
pub struct HalBus<S> {
    spi: S,
}

impl<S: spi::SpiBus<u8>> HalBus<S> {
    /// Wrap a HAL SPI bus
    pub fn new(spi: S) -> Self {
        Self { spi }
    }

    /// Return the wrapped bus
    pub fn into_inner(self) -> S {
        self.spi
    }
}

impl<S: spi::SpiBus<u8>> SpiBus for HalBus<S> {
    fn transmit(&mut self, bytes: &[u8], _timeout: Duration) -> Result<(), BusError> {
        self.spi.write(bytes).map_err(bus_error)?;
        self.spi.flush().map_err(bus_error)
    }

    fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<(), BusError> {
        self.spi.read(buf).map_err(bus_error)?;
        self.spi.flush().map_err(bus_error)
    }
}

/// [`GpioOutput`] driving a single HAL output pin
///
/// The pin is bound at construction, so the port and pin arguments are
/// ignored.
pub struct HalCs<P> {
    pin: P,
}

impl<P: OutputPin> HalCs<P> {
    /// Wrap a HAL output pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Return the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> GpioOutput for HalCs<P> {
    type Port = ();

    fn set(&mut self, _port: (), _pin: u32, level: PinLevel) {
        let result = match level {
            PinLevel::Low => self.pin.set_low(),
            PinLevel::High => self.pin.set_high(),
        };
        if result.is_err() {
            log::error!("mx25: failed to drive chip select {:?}", level);
        }
    }
}

/// [`Delay`] over an embedded-hal `DelayNs`
pub struct HalDelay<D>(pub D);

impl<D: DelayNs> Delay for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }
}
