//! mx25-linux - Linux back-end for the MX25V8035F driver
//!
//! Provides an [`SpiBus`](mx25_core::transport::SpiBus) over `/dev/spidevX.Y`
//! and a [`GpioOutput`](mx25_core::transport::GpioOutput) over
//! `/dev/gpiochipN`. The spidev controller is configured with `SPI_NO_CS` so
//! chip select is driven exclusively through the GPIO line, which is what
//! lets the driver keep one select window open across several transfers.
//!
//! # Usage with mx25flash CLI
//!
//! ```bash
//! # Probe using spidev0.0 with CS on gpiochip0 line 8
//! mx25flash probe -p linux_spi:dev=/dev/spidev0.0,cs=8
//!
//! # Specify SPI speed in kHz and a different GPIO chip
//! mx25flash read -p linux_spi:dev=/dev/spidev1.0,spispeed=8000,gpiochip=1,cs=17 -o flash.bin
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with `CONFIG_SPI_SPIDEV` and the GPIO character device
//! - Read/write access to the spidev and gpiochip nodes

mod error;
mod gpio;
mod spi;

pub use error::{LinuxError, Result};
pub use gpio::{chip_path, LinuxGpio};
pub use spi::{LinuxSpi, LinuxSpiConfig, DEFAULT_SPEED_HZ};

use mx25_core::transport::ChipSelect;

/// Everything needed to open the Linux back-end
#[derive(Debug, Clone)]
pub struct LinuxConfig {
    /// spidev settings
    pub spi: LinuxSpiConfig,
    /// gpiochip index holding the chip select line
    pub gpiochip: u32,
    /// Line offset of the chip select
    pub cs: u32,
}

impl LinuxConfig {
    /// Chip select descriptor matching this configuration
    pub fn chip_select(&self) -> ChipSelect<u32> {
        ChipSelect::new(self.gpiochip, self.cs)
    }
}

/// Parse programmer options from a list of key-value pairs
///
/// Recognised keys: `dev` (required), `cs` (required), `gpiochip`
/// (default 0), `spispeed` in kHz (default 2000) and `mode` (0-3).
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxConfig, String> {
    let mut spi = LinuxSpiConfig::default();
    let mut gpiochip = 0;
    let mut cs = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                spi.device = value.to_string();
            }
            "spispeed" => {
                let speed_khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid spispeed value: {}", value))?;
                if speed_khz == 0 {
                    return Err("spispeed must be non-zero".to_string());
                }
                spi.speed_hz = speed_khz
                    .checked_mul(1000)
                    .ok_or_else(|| format!("spispeed too large: {}", value))?;
            }
            "mode" => {
                let mode: u8 = value
                    .parse()
                    .map_err(|_| format!("Invalid mode value: {}", value))?;
                if mode > 3 {
                    return Err(format!("Invalid SPI mode: {} (must be 0-3)", mode));
                }
                spi.mode = mode;
            }
            "gpiochip" => {
                gpiochip = value
                    .parse()
                    .map_err(|_| format!("Invalid gpiochip value: {}", value))?;
            }
            "cs" => {
                cs = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid cs value: {}", value))?,
                );
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if spi.device.is_empty() {
        return Err(LinuxError::NoDevice.to_string());
    }
    let cs = cs.ok_or_else(|| LinuxError::NoChipSelect.to_string())?;

    Ok(LinuxConfig { spi, gpiochip, cs })
}

/// Open the spidev node and claim the chip select line
pub fn open(config: &LinuxConfig) -> Result<(LinuxSpi, LinuxGpio)> {
    let spi = LinuxSpi::open(&config.spi)?;
    let gpio = LinuxGpio::open(config.gpiochip, config.cs)?;
    Ok((spi, gpio))
}
