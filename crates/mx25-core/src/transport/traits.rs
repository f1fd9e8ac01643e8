//! Collaborator trait definitions

use core::fmt;
use core::time::Duration;

/// Failure reported by a [`SpiBus`] transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The transfer did not complete within the timeout
    Timeout,
    /// The controller reported a fault
    Fault,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transfer timed out"),
            Self::Fault => write!(f, "bus fault"),
        }
    }
}

/// Blocking, half-duplex SPI transport
///
/// Implementations must not touch the chip select line; the command layer
/// drives it through [`GpioOutput`] around every frame.
pub trait SpiBus {
    /// Clock `bytes` out to the chip, blocking for at most `timeout`
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), BusError>;

    /// Clock `buf.len()` bytes in from the chip, blocking for at most `timeout`
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), BusError>;
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), BusError> {
        (**self).transmit(bytes, timeout)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), BusError> {
        (**self).receive(buf, timeout)
    }
}

#[cfg(feature = "alloc")]
impl<T: SpiBus + ?Sized> SpiBus for alloc::boxed::Box<T> {
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), BusError> {
        (**self).transmit(bytes, timeout)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), BusError> {
        (**self).receive(buf, timeout)
    }
}

/// Electrical level of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low
    Low,
    /// Logic high
    High,
}

/// GPIO output capability used for chip select
pub trait GpioOutput {
    /// Identifies a GPIO port (bank, controller or gpiochip)
    type Port: Copy + fmt::Debug;

    /// Drive `pin` on `port` to `level`
    fn set(&mut self, port: Self::Port, pin: u32, level: PinLevel);
}

impl<T: GpioOutput + ?Sized> GpioOutput for &mut T {
    type Port = T::Port;

    fn set(&mut self, port: Self::Port, pin: u32, level: PinLevel) {
        (**self).set(port, pin, level)
    }
}

#[cfg(feature = "alloc")]
impl<T: GpioOutput + ?Sized> GpioOutput for alloc::boxed::Box<T> {
    type Port = T::Port;

    fn set(&mut self, port: Self::Port, pin: u32, level: PinLevel) {
        (**self).set(port, pin, level)
    }
}

/// Blocking delay, used when polling for the end of a program or erase
pub trait Delay {
    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

/// [`Delay`] backed by `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}
