//! MX25V8035F identity and geometry

/// Macronix manufacturer ID as returned by REMS
pub const MANUFACTURER_ID: u8 = 0xC2;
/// MX25V8035F device ID as returned by REMS
pub const DEVICE_ID: u8 = 0x14;

/// Vendor name
pub const VENDOR: &str = "Macronix";
/// Chip name
pub const NAME: &str = "MX25V8035F";

/// Total size in bytes (8 Mbit)
pub const TOTAL_SIZE: u32 = 1024 * 1024;
/// Page size - the largest payload of a single page program
pub const PAGE_SIZE: usize = 256;
/// Smallest erasable unit
pub const SECTOR_SIZE: u32 = 4096;

/// Byte value of erased flash
pub const ERASED: u8 = 0xFF;

/// Returns the offset of `address` within its page
pub const fn page_offset(address: u32) -> usize {
    (address as usize) & (PAGE_SIZE - 1)
}

/// Returns true if `len` bytes starting at `address` fit in the chip
pub fn in_bounds(address: u32, len: usize) -> bool {
    (address as u64) + (len as u64) <= TOTAL_SIZE as u64
}
