//! Error types for the Linux back-end

use thiserror::Error;

/// Linux spidev / GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to 0x{mode:02X}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// Failed to request the chip select line
    #[error("Failed to request GPIO line {line} on {chip}: {source}")]
    LineRequestFailed {
        chip: String,
        line: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/spidevX.Y")]
    NoDevice,

    /// Chip select line not specified
    #[error("No chip select line specified. Use cs=<line offset>")]
    NoChipSelect,
}

/// Result type for Linux back-end operations
pub type Result<T> = std::result::Result<T, LinuxError>;
