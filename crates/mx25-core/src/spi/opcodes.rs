//! MX25V8035 command opcodes
//!
//! Every opcode is a single byte transmitted MSB first as the first byte of
//! a frame.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - sets WEL, required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status register
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;

// ============================================================================
// Identification
// ============================================================================

/// Read Electronic Manufacturer & Device ID
///
/// Followed by two dummy bytes and an address byte (0 returns manufacturer
/// first), then the chip shifts out two ID bytes.
pub const REMS: u8 = 0x90;

// ============================================================================
// Read / program / erase
// ============================================================================

/// Read Data with 3-byte address
pub const READ: u8 = 0x03;
/// Page Program with 3-byte address
pub const PP: u8 = 0x02;
/// Chip Erase (entire chip)
pub const CE_60: u8 = 0x60;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register: Write In Progress
pub const SR_WIP: u8 = 0x01;
/// Status Register: Write Enable Latch
pub const SR_WEL: u8 = 0x02;
