//! mx25-dummy - In-memory MX25V8035F emulator
//!
//! This crate emulates the chip behind the [`SpiBus`] and [`GpioOutput`]
//! traits, so the command layer and the CLI can run without hardware.
//!
//! The emulator sees the bus the way the chip does: bytes clocked in while
//! chip select is low form one frame, reads are answered from the frame's
//! opcode, and write commands take effect when chip select is released.
//! Bus and chip select are separate handles onto the same chip:
//!
//! ```ignore
//! let flash = DummyFlash::new_default();
//! let (mut bus, mut cs) = (flash.bus(), flash.cs());
//! let mut dev = Device::new(&mut bus, &mut cs, ChipSelect::new(0, 0), DEFAULT_TIMEOUT);
//! protocol::verify_id(&mut dev)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};
use core::time::Duration;

use mx25_core::chip;
use mx25_core::spi::{opcodes, Status, HEADER_LEN};
use mx25_core::transport::{BusError, GpioOutput, PinLevel, SpiBus};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Manufacturer ID returned by REMS
    pub manufacturer_id: u8,
    /// Device ID returned by REMS
    pub device_id: u8,
    /// Flash size in bytes
    pub size: usize,
    /// Status reads that report WIP after a page program
    pub program_busy_polls: u32,
    /// Status reads that report WIP after a chip erase
    pub erase_busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: chip::MANUFACTURER_ID,
            device_id: chip::DEVICE_ID,
            size: chip::TOTAL_SIZE as usize,
            program_busy_polls: 0,
            erase_busy_polls: 3,
        }
    }
}

impl DummyConfig {
    /// Check that the array is non-empty and a whole number of pages
    pub fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("dummy flash size must be non-zero".into());
        }
        if self.size % chip::PAGE_SIZE != 0 {
            return Err(format!(
                "dummy flash size {} is not a multiple of the {}-byte page",
                self.size,
                chip::PAGE_SIZE
            ));
        }
        Ok(())
    }
}

/// Bus activity counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Chip select assertions
    pub selects: usize,
    /// Chip select releases
    pub deselects: usize,
    /// Frames whose command was ignored (latch clear or chip busy)
    pub ignored: usize,
}

struct Chip {
    config: DummyConfig,
    data: Vec<u8>,
    status: Status,
    busy_polls: u32,
    selected: bool,
    frame: Vec<u8>,
    read_offset: usize,
    stats: Stats,
}

impl Chip {
    fn select(&mut self) {
        if self.selected {
            log::warn!("dummy: chip select asserted twice");
        }
        self.selected = true;
        self.frame.clear();
        self.read_offset = 0;
        self.stats.selects += 1;
    }

    fn deselect(&mut self) {
        if self.selected {
            self.execute();
        }
        self.selected = false;
        self.stats.deselects += 1;
    }

    fn frame_address(&self) -> usize {
        let addr = ((self.frame[1] as usize) << 16)
            | ((self.frame[2] as usize) << 8)
            | (self.frame[3] as usize);
        addr.checked_rem(self.config.size).unwrap_or(0)
    }

    /// Run the write command collected in the frame, as the chip does on
    /// the rising edge of chip select
    fn execute(&mut self) {
        let Some(&opcode) = self.frame.first() else {
            return;
        };

        if self.status.is_busy() && opcode != opcodes::RDSR {
            log::debug!("dummy: ignoring 0x{:02X} while busy", opcode);
            self.stats.ignored += 1;
            return;
        }

        match opcode {
            opcodes::WREN if self.frame.len() == 1 => self.status.insert(Status::WEL),
            opcodes::WRDI if self.frame.len() == 1 => self.status.remove(Status::WEL),
            opcodes::CE_60 if self.frame.len() == 1 => {
                if !self.status.write_enabled() {
                    self.stats.ignored += 1;
                    return;
                }
                self.data.fill(chip::ERASED);
                self.start_busy(self.config.erase_busy_polls);
            }
            opcodes::PP if self.frame.len() > HEADER_LEN => {
                if !self.status.write_enabled() {
                    self.stats.ignored += 1;
                    return;
                }
                self.program_page();
                self.start_busy(self.config.program_busy_polls);
            }
            opcodes::RDSR | opcodes::REMS | opcodes::READ => {}
            _ => {
                log::debug!("dummy: unsupported frame {:02X?}", self.frame);
                self.stats.ignored += 1;
            }
        }
    }

    fn program_page(&mut self) {
        let addr = self.frame_address();
        let page_base = addr & !(chip::PAGE_SIZE - 1);
        let payload = &self.frame[HEADER_LEN..];
        // Only the last page worth of data is kept when more is sent
        let skip = payload.len().saturating_sub(chip::PAGE_SIZE);

        for (i, &byte) in payload.iter().enumerate().skip(skip) {
            let offset = (addr + i - skip) & (chip::PAGE_SIZE - 1);
            // Flash programming: can only change 1 -> 0
            if let Some(cell) = self.data.get_mut(page_base + offset) {
                *cell &= byte;
            }
        }
    }

    fn start_busy(&mut self, polls: u32) {
        if polls == 0 {
            self.status.remove(Status::WEL);
        } else {
            self.status.insert(Status::WIP);
            self.busy_polls = polls;
        }
    }

    fn poll_status(&mut self) -> u8 {
        let value = self.status.bits();
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            if self.busy_polls == 0 {
                self.status.remove(Status::WIP | Status::WEL);
            }
        }
        value
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        if !self.selected {
            log::warn!("dummy: transmit without chip select");
            return Err(BusError::Fault);
        }
        self.frame.extend_from_slice(bytes);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        if !self.selected {
            log::warn!("dummy: receive without chip select");
            return Err(BusError::Fault);
        }

        let opcode = self.frame.first().copied();
        if self.status.is_busy() && opcode != Some(opcodes::RDSR) {
            buf.fill(0xFF);
            return Ok(());
        }

        match opcode {
            Some(opcodes::RDSR) => {
                for byte in buf.iter_mut() {
                    *byte = self.poll_status();
                }
            }
            Some(opcodes::REMS) if self.frame.len() >= HEADER_LEN => {
                let id = if self.frame[3] & 1 == 0 {
                    [self.config.manufacturer_id, self.config.device_id]
                } else {
                    [self.config.device_id, self.config.manufacturer_id]
                };
                for (byte, value) in buf.iter_mut().zip(id.iter().cycle()) {
                    *byte = *value;
                }
            }
            Some(opcodes::READ) if self.frame.len() >= HEADER_LEN => {
                let start = self.frame_address() + self.read_offset;
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = (start + i)
                        .checked_rem(self.config.size)
                        .and_then(|index| self.data.get(index).copied())
                        .unwrap_or(chip::ERASED);
                }
                self.read_offset += buf.len();
            }
            _ => buf.fill(0xFF),
        }
        Ok(())
    }
}

/// Dummy flash chip
///
/// Emulates an MX25V8035F in memory for testing purposes.
pub struct DummyFlash {
    chip: Rc<RefCell<Chip>>,
}

impl DummyFlash {
    /// Create a new erased dummy flash with the given configuration
    ///
    /// An invalid geometry (see [`DummyConfig::validate`]) is accepted, but
    /// writes past the end of the array are dropped and reads return 0xFF.
    pub fn new(config: DummyConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("dummy: {}", e);
        }
        let data = vec![chip::ERASED; config.size];
        Self {
            chip: Rc::new(RefCell::new(Chip {
                config,
                data,
                status: Status::empty(),
                busy_polls: 0,
                selected: false,
                frame: Vec::new(),
                read_offset: 0,
                stats: Stats::default(),
            })),
        }
    }

    /// Create a new dummy flash with default configuration (MX25V8035F)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let flash = Self::new(config);
        {
            let mut chip = flash.chip.borrow_mut();
            let len = core::cmp::min(initial_data.len(), chip.data.len());
            chip.data[..len].copy_from_slice(&initial_data[..len]);
        }
        flash
    }

    /// Bus handle onto this chip
    pub fn bus(&self) -> DummyBus {
        DummyBus {
            chip: Rc::clone(&self.chip),
        }
    }

    /// Chip select handle onto this chip
    pub fn cs(&self) -> DummyCs {
        DummyCs {
            chip: Rc::clone(&self.chip),
        }
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> Ref<'_, [u8]> {
        Ref::map(self.chip.borrow(), |chip| chip.data.as_slice())
    }

    /// Current status register value
    pub fn status(&self) -> Status {
        self.chip.borrow().status
    }

    /// Whether chip select is currently asserted
    pub fn is_selected(&self) -> bool {
        self.chip.borrow().selected
    }

    /// Bus activity counters
    pub fn stats(&self) -> Stats {
        self.chip.borrow().stats
    }

    /// Get the configuration
    pub fn config(&self) -> DummyConfig {
        self.chip.borrow().config.clone()
    }
}

/// Data lines of a [`DummyFlash`]
pub struct DummyBus {
    chip: Rc<RefCell<Chip>>,
}

impl SpiBus for DummyBus {
    fn transmit(&mut self, bytes: &[u8], _timeout: Duration) -> Result<(), BusError> {
        self.chip.borrow_mut().transmit(bytes)
    }

    fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<(), BusError> {
        self.chip.borrow_mut().receive(buf)
    }
}

/// Chip select line of a [`DummyFlash`]
///
/// Any port and pin select the chip.
pub struct DummyCs {
    chip: Rc<RefCell<Chip>>,
}

impl GpioOutput for DummyCs {
    type Port = u32;

    fn set(&mut self, _port: u32, _pin: u32, level: PinLevel) {
        let mut chip = self.chip.borrow_mut();
        match level {
            PinLevel::Low => chip.select(),
            PinLevel::High => chip.deselect(),
        }
    }
}
