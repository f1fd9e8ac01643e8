//! Error types for mx25-core
//!
//! This module provides a no_std compatible error type shared by every
//! command in the crate.

use core::fmt;

use crate::transport::BusError;

/// Why caller-supplied arguments were rejected
///
/// Parameter errors are always detected before any bus activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// More data than fits in one page was passed to a page program
    PageOverflow {
        /// Length of the rejected payload
        len: usize,
    },
    /// A full-page write did not start on a page boundary
    MisalignedPage {
        /// Requested start address
        address: u32,
    },
    /// A page program was requested with no data
    EmptyData,
    /// The requested range extends past the end of the chip
    OutOfBounds {
        /// Requested start address
        address: u32,
        /// Requested length in bytes
        len: usize,
    },
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The underlying bus transmit or receive failed
    Communication(BusError),
    /// A status register bit did not reach the expected state after a
    /// latch-changing command
    RegisterVerification {
        /// Status register value read back
        status: u8,
    },
    /// The chip answered the ID request with an unexpected identity
    IdentityMismatch {
        /// Manufacturer ID byte read back
        manufacturer: u8,
        /// Device ID byte read back
        device: u8,
    },
    /// Caller-supplied arguments violate a precondition
    Parameter(ParameterError),
    /// The chip stayed busy for longer than the polling budget
    Timeout,
    /// Read-back data differs from what was expected
    VerifyMismatch {
        /// Address of the first differing byte
        address: u32,
    },
}

impl From<BusError> for Error {
    fn from(err: BusError) -> Self {
        Self::Communication(err)
    }
}

impl From<ParameterError> for Error {
    fn from(err: ParameterError) -> Self {
        Self::Parameter(err)
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageOverflow { len } => {
                write!(f, "{} bytes do not fit in a 256 byte page", len)
            }
            Self::MisalignedPage { address } => write!(
                f,
                "full page write must start on a page boundary (got 0x{:06X})",
                address
            ),
            Self::EmptyData => write!(f, "no data to program"),
            Self::OutOfBounds { address, len } => write!(
                f,
                "range 0x{:06X}+{} is outside the chip",
                address, len
            ),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication(err) => write!(f, "SPI communication failed: {}", err),
            Self::RegisterVerification { status } => write!(
                f,
                "status register did not reach the expected state (0x{:02X})",
                status
            ),
            Self::IdentityMismatch {
                manufacturer,
                device,
            } => write!(
                f,
                "unexpected chip identity {:02X} {:02X}",
                manufacturer, device
            ),
            Self::Parameter(err) => write!(f, "invalid parameter: {}", err),
            Self::Timeout => write!(f, "chip did not become ready in time"),
            Self::VerifyMismatch { address } => {
                write!(f, "verify failed: data mismatch at 0x{:06X}", address)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
