//! SPI framing for the MX25 command set
//!
//! This module provides the command opcodes, the 24-bit address framing
//! used by every addressed command, and the status register layout.

mod address;
pub mod opcodes;
mod status;

pub use address::{encode_address, header, HEADER_LEN};
pub use opcodes::*;
pub use status::Status;
