//! Status register layout

use bitflags::bitflags;

use super::opcodes;

bitflags! {
    /// MX25V8035F status register
    ///
    /// Only WIP and WEL are acted upon by the driver; the remaining bits are
    /// decoded for display.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Write In Progress - a program/erase is still executing
        const WIP  = opcodes::SR_WIP;
        /// Write Enable Latch - set by WREN, cleared by WRDI and on completion
        const WEL  = opcodes::SR_WEL;
        /// Block Protect bit 0
        const BP0  = 1 << 2;
        /// Block Protect bit 1
        const BP1  = 1 << 3;
        /// Block Protect bit 2
        const BP2  = 1 << 4;
        /// Block Protect bit 3
        const BP3  = 1 << 5;
        /// Quad Enable
        const QE   = 1 << 6;
        /// Status Register Write Disable
        const SRWD = 1 << 7;
    }
}

impl Status {
    /// Returns true if a program or erase is still executing
    pub fn is_busy(&self) -> bool {
        self.contains(Self::WIP)
    }

    /// Returns true if the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.contains(Self::WEL)
    }

    /// Block protect level (BP3..BP0)
    pub fn block_protect(&self) -> u8 {
        (self.bits() >> 2) & 0x0F
    }
}

impl From<u8> for Status {
    fn from(bits: u8) -> Self {
        Self::from_bits_retain(bits)
    }
}
