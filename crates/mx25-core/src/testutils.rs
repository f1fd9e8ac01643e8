//! Scripted bus and GPIO doubles for unit tests

use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use crate::chip;
use crate::spi::opcodes;
use crate::transport::{BusError, ChipSelect, GpioOutput, PinLevel, SpiBus};
use crate::Device;

/// Chip select used by every test device
pub const CS: ChipSelect<u8> = ChipSelect::new(b'A', 4);

/// Bus-visible event, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    Transmit(Vec<u8>),
    Receive(usize),
}

/// Shared, ordered record of everything the driver did
#[derive(Default)]
pub struct Log(RefCell<Vec<Event>>);

impl Log {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn transmits(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Transmit(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.0.borrow().iter().filter(|e| *e == wanted).count()
    }

    /// Check that selects and deselects strictly alternate, starting with a
    /// select and ending deselected, and that no transfer happens outside a
    /// select window
    pub fn assert_cs_paired(&self) {
        let mut selected = false;
        for event in self.0.borrow().iter() {
            match event {
                Event::Select => {
                    assert!(!selected, "chip selected twice");
                    selected = true;
                }
                Event::Deselect => {
                    assert!(selected, "chip deselected while not selected");
                    selected = false;
                }
                Event::Transmit(_) | Event::Receive(_) => {
                    assert!(selected, "transfer outside a chip select window")
                }
            }
        }
        assert!(!selected, "chip left selected");
    }

    /// True if nothing has been transferred since the last select
    fn frame_start(&self) -> bool {
        matches!(self.0.borrow().last(), Some(Event::Select))
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }
}

/// Bus answering like an idle MX25V8035F, with fault injection
pub struct MockBus<'l> {
    log: &'l Log,
    /// Status byte returned by RDSR
    pub status: u8,
    /// Bytes returned by REMS
    pub id: [u8; 2],
    /// Fail the n-th transmit call (0-based)
    pub fail_transmit: Option<usize>,
    /// Fail the n-th receive call (0-based)
    pub fail_receive: Option<usize>,
    /// Error returned by injected failures
    pub error: BusError,
    last_opcode: Option<u8>,
    transmits: usize,
    receives: usize,
}

impl<'l> MockBus<'l> {
    pub fn new(log: &'l Log) -> Self {
        Self {
            log,
            status: opcodes::SR_WEL,
            id: [chip::MANUFACTURER_ID, chip::DEVICE_ID],
            fail_transmit: None,
            fail_receive: None,
            error: BusError::Timeout,
            last_opcode: None,
            transmits: 0,
            receives: 0,
        }
    }

    pub fn bus_calls(&self) -> usize {
        self.transmits + self.receives
    }
}

impl SpiBus for MockBus<'_> {
    fn transmit(&mut self, bytes: &[u8], _timeout: Duration) -> Result<(), BusError> {
        let n = self.transmits;
        self.transmits += 1;
        if self.log.frame_start() {
            self.last_opcode = bytes.first().copied();
        }
        self.log.push(Event::Transmit(bytes.to_vec()));
        if self.fail_transmit == Some(n) {
            return Err(self.error);
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<(), BusError> {
        let n = self.receives;
        self.receives += 1;
        self.log.push(Event::Receive(buf.len()));
        if self.fail_receive == Some(n) {
            return Err(self.error);
        }
        match self.last_opcode {
            Some(opcodes::RDSR) => buf.fill(self.status),
            Some(opcodes::REMS) => {
                for (dst, src) in buf.iter_mut().zip(self.id.iter().cycle()) {
                    *dst = *src;
                }
            }
            _ => {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = i as u8;
                }
            }
        }
        Ok(())
    }
}

/// Chip select line recording into the shared log
pub struct MockGpio<'l> {
    log: &'l Log,
    pub levels: Vec<(u8, u32, PinLevel)>,
}

impl<'l> MockGpio<'l> {
    pub fn new(log: &'l Log) -> Self {
        Self {
            log,
            levels: vec![],
        }
    }
}

impl GpioOutput for MockGpio<'_> {
    type Port = u8;

    fn set(&mut self, port: u8, pin: u32, level: PinLevel) {
        self.levels.push((port, pin, level));
        self.log.push(match level {
            PinLevel::Low => Event::Select,
            PinLevel::High => Event::Deselect,
        });
    }
}

/// Build a device over the mocks with a fixed timeout
pub fn device<'a, 'l>(
    bus: &'a mut MockBus<'l>,
    gpio: &'a mut MockGpio<'l>,
) -> Device<'a, MockBus<'l>, MockGpio<'l>> {
    Device::new(bus, gpio, CS, Duration::from_millis(10))
}
