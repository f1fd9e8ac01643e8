//! GPIO chip select over the character device interface
//!
//! A port is a gpiochip index (`/dev/gpiochipN`) and a pin is a line offset
//! on that chip. Lines are requested as outputs, initially high (deselected).

use crate::error::{LinuxError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};
use mx25_core::transport::{GpioOutput, PinLevel};

use std::collections::HashMap;

const CONSUMER: &str = "mx25flash";

/// Path of the gpiochip character device with the given index
pub fn chip_path(chip: u32) -> String {
    format!("/dev/gpiochip{}", chip)
}

fn request_line(chip: u32, line: Offset) -> Result<Request> {
    let path = chip_path(chip);
    let mut req_config = Config::default();
    req_config.with_line(line).as_output(Value::Active);

    Request::from_config(req_config)
        .on_chip(&path)
        .with_consumer(CONSUMER)
        .request()
        .map_err(|source| LinuxError::LineRequestFailed {
            chip: path,
            line,
            source,
        })
}

/// Output lines driven through gpiocdev, implementing [`GpioOutput`]
#[derive(Default)]
pub struct LinuxGpio {
    requests: HashMap<(u32, Offset), Request>,
}

impl LinuxGpio {
    /// Create an instance with no lines requested yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `line` on gpiochip `chip` up front so that failures surface at open time
    pub fn open(chip: u32, line: Offset) -> Result<Self> {
        let mut gpio = Self::new();
        gpio.claim(chip, line)?;
        log::info!(
            "linux_gpio: Claimed line {} on {} for chip select",
            line,
            chip_path(chip)
        );
        Ok(gpio)
    }

    /// Request a line as an output, initially high. Already claimed lines are kept.
    pub fn claim(&mut self, chip: u32, line: Offset) -> Result<()> {
        if !self.requests.contains_key(&(chip, line)) {
            let request = request_line(chip, line)?;
            self.requests.insert((chip, line), request);
        }
        Ok(())
    }
}

impl GpioOutput for LinuxGpio {
    type Port = u32;

    fn set(&mut self, port: u32, pin: u32, level: PinLevel) {
        if let Err(e) = self.claim(port, pin) {
            log::error!("linux_gpio: {}", e);
            return;
        }
        let value = match level {
            PinLevel::Low => Value::Inactive,
            PinLevel::High => Value::Active,
        };
        if let Some(request) = self.requests.get(&(port, pin)) {
            if let Err(e) = request.set_value(pin, value) {
                log::error!("linux_gpio: Failed to set line {}: {}", pin, e);
            }
        }
    }
}
