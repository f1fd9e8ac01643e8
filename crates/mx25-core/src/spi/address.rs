//! 24-bit address framing

/// Length of an addressed command header (opcode + 3 address bytes)
pub const HEADER_LEN: usize = 4;

/// Encode the low 24 bits of an address big-endian into 3 bytes
///
/// The top byte of `address` is ignored.
pub const fn encode_address(address: u32) -> [u8; 3] {
    [(address >> 16) as u8, (address >> 8) as u8, address as u8]
}

/// Build the 4-byte header of an addressed command
pub const fn header(opcode: u8, address: u32) -> [u8; HEADER_LEN] {
    let addr = encode_address(address);
    [opcode, addr[0], addr[1], addr[2]]
}
