//! Register primitives and data operations

use crate::chip;
use crate::device::Device;
use crate::error::{Error, ParameterError, Result};
use crate::spi::{self, opcodes, Status};
use crate::transport::{GpioOutput, SpiBus};

/// Read the manufacturer and device ID bytes (REMS)
///
/// Sends `[REMS, 0, 0, 0]` and reads back two bytes, manufacturer first.
pub fn read_id<B, G>(dev: &mut Device<'_, B, G>) -> Result<(u8, u8)>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    let frame = [opcodes::REMS, 0x00, 0x00, 0x00];
    let mut id = [0u8; 2];
    dev.transaction(|bus, timeout| {
        bus.transmit(&frame, timeout)?;
        bus.receive(&mut id, timeout)?;
        Ok(())
    })?;
    log::trace!("mx25: REMS returned {:02X} {:02X}", id[0], id[1]);
    Ok((id[0], id[1]))
}

/// Check that the chip answers with the MX25V8035F identity
///
/// Bus failures are reported as [`Error::Communication`]; a completed
/// exchange returning any other pair is [`Error::IdentityMismatch`].
pub fn verify_id<B, G>(dev: &mut Device<'_, B, G>) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    let (manufacturer, device) = read_id(dev)?;
    if manufacturer == chip::MANUFACTURER_ID && device == chip::DEVICE_ID {
        Ok(())
    } else {
        log::debug!(
            "mx25: identity mismatch, expected {:02X} {:02X}, got {:02X} {:02X}",
            chip::MANUFACTURER_ID,
            chip::DEVICE_ID,
            manufacturer,
            device
        );
        Err(Error::IdentityMismatch {
            manufacturer,
            device,
        })
    }
}

/// Read the status register
pub fn read_status<B, G>(dev: &mut Device<'_, B, G>) -> Result<u8>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    let mut status = [0u8; 1];
    dev.transaction(|bus, timeout| {
        bus.transmit(&[opcodes::RDSR], timeout)?;
        bus.receive(&mut status, timeout)?;
        Ok(())
    })?;
    Ok(status[0])
}

/// Send a single-byte command in its own chip select window
fn send_command<B, G>(dev: &mut Device<'_, B, G>, opcode: u8) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    log::trace!("mx25: command 0x{:02X}", opcode);
    dev.transaction(|bus, timeout| Ok(bus.transmit(&[opcode], timeout)?))
}

/// Set the write enable latch and confirm it took effect
///
/// The status register is always read back after WREN; a clear WEL bit is
/// reported as [`Error::RegisterVerification`].
pub fn write_enable<B, G>(dev: &mut Device<'_, B, G>) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    send_command(dev, opcodes::WREN)?;
    let status = Status::from(read_status(dev)?);
    if status.write_enabled() {
        Ok(())
    } else {
        log::debug!("mx25: WEL not set after WREN (status 0x{:02X})", status.bits());
        Err(Error::RegisterVerification {
            status: status.bits(),
        })
    }
}

/// Clear the write enable latch and confirm it took effect
pub fn write_disable<B, G>(dev: &mut Device<'_, B, G>) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    send_command(dev, opcodes::WRDI)?;
    let status = Status::from(read_status(dev)?);
    if status.write_enabled() {
        log::debug!("mx25: WEL still set after WRDI (status 0x{:02X})", status.bits());
        Err(Error::RegisterVerification {
            status: status.bits(),
        })
    } else {
        Ok(())
    }
}

/// Erase the entire chip
///
/// Returns as soon as the erase command has been accepted by the bus. The
/// erase itself keeps running inside the chip; poll [`read_status`] (or use
/// [`wait_ready`](super::wait_ready)) until WIP clears before issuing further
/// program or erase commands.
pub fn chip_erase<B, G>(dev: &mut Device<'_, B, G>) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    write_enable(dev)?;
    send_command(dev, opcodes::CE_60)
}

/// Check the page program preconditions without touching the bus
pub fn check_page_program(address: u32, data: &[u8]) -> core::result::Result<(), ParameterError> {
    if data.is_empty() {
        return Err(ParameterError::EmptyData);
    }
    if data.len() > chip::PAGE_SIZE {
        return Err(ParameterError::PageOverflow { len: data.len() });
    }
    if data.len() == chip::PAGE_SIZE && chip::page_offset(address) != 0 {
        return Err(ParameterError::MisalignedPage { address });
    }
    Ok(())
}

/// Program up to one page of data
///
/// The write enable latch is set first, then the 4-byte header and the
/// payload are sent inside one chip select window. On success `*address`
/// is advanced by `data.len()` so consecutive calls stream through memory;
/// on any error it is left untouched.
///
/// A payload shorter than a page may start anywhere; bytes running past the
/// end of the page wrap around to its start, as the chip does. Does not wait
/// for the program to finish.
pub fn page_program<B, G>(dev: &mut Device<'_, B, G>, address: &mut u32, data: &[u8]) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    check_page_program(*address, data)?;
    write_enable(dev)?;

    let header = spi::header(opcodes::PP, *address);
    log::trace!("mx25: PP 0x{:06X} ({} bytes)", *address & 0xFF_FFFF, data.len());
    dev.transaction(|bus, timeout| {
        bus.transmit(&header, timeout)?;
        bus.transmit(data, timeout)?;
        Ok(())
    })?;

    *address = address.wrapping_add(data.len() as u32);
    Ok(())
}

/// Read `buf.len()` bytes starting at `address`
///
/// No bound is placed on the length; the chip wraps to address 0 after its
/// last byte. An empty buffer returns immediately.
pub fn read_into<B, G>(dev: &mut Device<'_, B, G>, address: u32, buf: &mut [u8]) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    if buf.is_empty() {
        return Ok(());
    }
    if dev.write_enable_before_read() {
        write_enable(dev)?;
    }

    let header = spi::header(opcodes::READ, address);
    log::trace!("mx25: READ 0x{:06X} ({} bytes)", address & 0xFF_FFFF, buf.len());
    dev.transaction(|bus, timeout| {
        bus.transmit(&header, timeout)?;
        bus.receive(buf, timeout)?;
        Ok(())
    })
}

/// Read `length` bytes starting at `address` into a new buffer
#[cfg(feature = "alloc")]
pub fn read_data<B, G>(
    dev: &mut Device<'_, B, G>,
    address: u32,
    length: u32,
) -> Result<alloc::vec::Vec<u8>>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    let mut data = alloc::vec![0u8; length as usize];
    read_into(dev, address, &mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{device, Event, Log, MockBus, MockGpio, CS};
    use crate::transport::{BusError, PinLevel};
    use alloc::vec;
    use alloc::vec::Vec;

    fn wren_events() -> Vec<Event> {
        vec![
            Event::Select,
            Event::Transmit(vec![opcodes::WREN]),
            Event::Deselect,
            Event::Select,
            Event::Transmit(vec![opcodes::RDSR]),
            Event::Receive(1),
            Event::Deselect,
        ]
    }

    #[test]
    fn test_verify_id() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        verify_id(&mut device(&mut bus, &mut gpio)).unwrap();

        assert_eq!(
            log.events(),
            vec![
                Event::Select,
                Event::Transmit(vec![opcodes::REMS, 0, 0, 0]),
                Event::Receive(2),
                Event::Deselect,
            ]
        );
        assert_eq!(
            gpio.levels,
            vec![(CS.port, CS.pin, PinLevel::Low), (CS.port, CS.pin, PinLevel::High)]
        );
    }

    #[test]
    fn test_verify_id_mismatch() {
        let pairs = [[0xC2, 0x15], [0xEF, 0x14], [0x14, 0xC2], [0x00, 0x00], [0xFF, 0xFF]];
        for id in pairs {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            bus.id = id;
            let mut gpio = MockGpio::new(&log);
            let err = verify_id(&mut device(&mut bus, &mut gpio)).unwrap_err();
            assert_eq!(
                err,
                Error::IdentityMismatch {
                    manufacturer: id[0],
                    device: id[1]
                }
            );
            log.assert_cs_paired();
        }
    }

    #[test]
    fn test_verify_id_bus_failure_is_not_mismatch() {
        // Transmit failure: nothing is received
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.id = [0x12, 0x34];
        bus.fail_transmit = Some(0);
        let mut gpio = MockGpio::new(&log);
        let err = verify_id(&mut device(&mut bus, &mut gpio)).unwrap_err();
        assert_eq!(err, Error::Communication(BusError::Timeout));
        assert_eq!(log.count(&Event::Receive(2)), 0);
        log.assert_cs_paired();

        // Receive failure
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.id = [0x12, 0x34];
        bus.fail_receive = Some(0);
        bus.error = BusError::Fault;
        let mut gpio = MockGpio::new(&log);
        let err = verify_id(&mut device(&mut bus, &mut gpio)).unwrap_err();
        assert_eq!(err, Error::Communication(BusError::Fault));
        log.assert_cs_paired();
    }

    #[test]
    fn test_read_status() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.status = 0x5A;
        let mut gpio = MockGpio::new(&log);
        assert_eq!(read_status(&mut device(&mut bus, &mut gpio)), Ok(0x5A));
        assert_eq!(
            log.events(),
            vec![
                Event::Select,
                Event::Transmit(vec![opcodes::RDSR]),
                Event::Receive(1),
                Event::Deselect,
            ]
        );
    }

    #[test]
    fn test_read_status_transmit_failure_deselects() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.fail_transmit = Some(0);
        let mut gpio = MockGpio::new(&log);
        let err = read_status(&mut device(&mut bus, &mut gpio)).unwrap_err();
        assert_eq!(err, Error::Communication(BusError::Timeout));
        assert_eq!(
            log.events(),
            vec![
                Event::Select,
                Event::Transmit(vec![opcodes::RDSR]),
                Event::Deselect,
            ]
        );
    }

    #[test]
    fn test_write_enable_checks_latch() {
        for status in [0x02, 0x03, 0xFE, 0xFF] {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            bus.status = status;
            let mut gpio = MockGpio::new(&log);
            assert_eq!(write_enable(&mut device(&mut bus, &mut gpio)), Ok(()));
            assert_eq!(log.events(), wren_events());
        }

        for status in [0x00, 0x01, 0xFD, 0x7C] {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            bus.status = status;
            let mut gpio = MockGpio::new(&log);
            assert_eq!(
                write_enable(&mut device(&mut bus, &mut gpio)),
                Err(Error::RegisterVerification { status })
            );
            log.assert_cs_paired();
        }
    }

    #[test]
    fn test_write_enable_status_read_failure() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.fail_receive = Some(0);
        let mut gpio = MockGpio::new(&log);
        assert_eq!(
            write_enable(&mut device(&mut bus, &mut gpio)),
            Err(Error::Communication(BusError::Timeout))
        );
        log.assert_cs_paired();
    }

    #[test]
    fn test_write_disable_checks_latch() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.status = 0x00;
        let mut gpio = MockGpio::new(&log);
        assert_eq!(write_disable(&mut device(&mut bus, &mut gpio)), Ok(()));
        assert_eq!(log.transmits(), vec![vec![opcodes::WRDI], vec![opcodes::RDSR]]);

        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.status = opcodes::SR_WEL;
        let mut gpio = MockGpio::new(&log);
        assert_eq!(
            write_disable(&mut device(&mut bus, &mut gpio)),
            Err(Error::RegisterVerification {
                status: opcodes::SR_WEL
            })
        );
        log.assert_cs_paired();
    }

    #[test]
    fn test_chip_erase_does_not_poll() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        // Report busy as well: the erase must not wait for WIP
        bus.status = opcodes::SR_WEL | opcodes::SR_WIP;
        let mut gpio = MockGpio::new(&log);
        chip_erase(&mut device(&mut bus, &mut gpio)).unwrap();

        let mut expected = wren_events();
        expected.extend([
            Event::Select,
            Event::Transmit(vec![opcodes::CE_60]),
            Event::Deselect,
        ]);
        assert_eq!(log.events(), expected);
    }

    #[test]
    fn test_chip_erase_requires_latch() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.status = 0;
        let mut gpio = MockGpio::new(&log);
        assert_eq!(
            chip_erase(&mut device(&mut bus, &mut gpio)),
            Err(Error::RegisterVerification { status: 0 })
        );
        assert!(!log.transmits().contains(&vec![opcodes::CE_60]));
    }

    #[test]
    fn test_page_program_rejects_oversized() {
        for len in [257, 258, 300, 512, 4096] {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            let mut gpio = MockGpio::new(&log);
            let data = vec![0xA5; len];
            let mut address = 0x1000;
            let err = page_program(&mut device(&mut bus, &mut gpio), &mut address, &data);
            assert_eq!(err, Err(Error::Parameter(ParameterError::PageOverflow { len })));
            assert_eq!(bus.bus_calls(), 0);
            assert!(log.events().is_empty());
            assert_eq!(address, 0x1000);
        }
    }

    #[test]
    fn test_full_page_must_be_aligned() {
        let data = [0u8; 256];
        for low in 1..=0xFFu32 {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            let mut gpio = MockGpio::new(&log);
            let mut address = 0x2000 | low;
            let err = page_program(&mut device(&mut bus, &mut gpio), &mut address, &data);
            assert_eq!(
                err,
                Err(Error::Parameter(ParameterError::MisalignedPage {
                    address: 0x2000 | low
                }))
            );
            assert!(log.events().is_empty());
        }

        for start in [0x00_0000, 0x00_0100, 0x0F_FF00] {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            let mut gpio = MockGpio::new(&log);
            let mut address = start;
            page_program(&mut device(&mut bus, &mut gpio), &mut address, &data).unwrap();
            assert_eq!(address, start + 256);
        }
    }

    #[test]
    fn test_page_program_rejects_empty() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        let mut address = 0;
        assert_eq!(
            page_program(&mut device(&mut bus, &mut gpio), &mut address, &[]),
            Err(Error::Parameter(ParameterError::EmptyData))
        );
        assert_eq!(bus.bus_calls(), 0);
    }

    #[test]
    fn test_page_program_advances_address() {
        for len in 1..=256usize {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            let mut gpio = MockGpio::new(&log);
            let data = vec![0x3C; len];
            let mut address = 0x4_0000;
            page_program(&mut device(&mut bus, &mut gpio), &mut address, &data).unwrap();
            assert_eq!(address, 0x4_0000 + len as u32);
            log.assert_cs_paired();
        }
    }

    #[test]
    fn test_page_program_frames() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        let data: Vec<u8> = (0..64).collect();
        let mut address = 0x00_0100;
        page_program(&mut device(&mut bus, &mut gpio), &mut address, &data).unwrap();

        assert_eq!(address, 0x00_0140);
        let mut expected = wren_events();
        expected.extend([
            Event::Select,
            Event::Transmit(vec![opcodes::PP, 0x00, 0x01, 0x00]),
            Event::Transmit(data.clone()),
            Event::Deselect,
        ]);
        assert_eq!(log.events(), expected);
    }

    #[test]
    fn test_page_program_failure_keeps_address() {
        // Transmits: 0 = WREN, 1 = RDSR, 2 = PP header, 3 = payload
        for fail in 0..4 {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            bus.fail_transmit = Some(fail);
            let mut gpio = MockGpio::new(&log);
            let mut address = 0x00_0100;
            let err = page_program(&mut device(&mut bus, &mut gpio), &mut address, &[1, 2, 3]);
            assert_eq!(err, Err(Error::Communication(BusError::Timeout)));
            assert_eq!(address, 0x00_0100);
            log.assert_cs_paired();
        }

        let log = Log::default();
        let mut bus = MockBus::new(&log);
        bus.fail_receive = Some(0);
        let mut gpio = MockGpio::new(&log);
        let mut address = 0x00_0100;
        let err = page_program(&mut device(&mut bus, &mut gpio), &mut address, &[1, 2, 3]);
        assert_eq!(err, Err(Error::Communication(BusError::Timeout)));
        assert_eq!(address, 0x00_0100);
        assert!(!log.transmits().iter().any(|t| t[0] == opcodes::PP));
        log.assert_cs_paired();
    }

    #[test]
    fn test_read_into_frames() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        let mut buf = [0u8; 16];
        read_into(&mut device(&mut bus, &mut gpio), 0x00_0000, &mut buf).unwrap();

        assert_eq!(
            log.events(),
            vec![
                Event::Select,
                Event::Transmit(vec![opcodes::READ, 0, 0, 0]),
                Event::Receive(16),
                Event::Deselect,
            ]
        );
        let expected: Vec<u8> = (0..16).collect();
        assert_eq!(&buf[..], &expected[..]);
    }

    #[test]
    fn test_read_with_write_enable_before_read() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        let mut dev = device(&mut bus, &mut gpio).with_write_enable_before_read(true);
        let mut buf = [0u8; 4];
        read_into(&mut dev, 0x12_3456, &mut buf).unwrap();

        let mut expected = wren_events();
        expected.extend([
            Event::Select,
            Event::Transmit(vec![opcodes::READ, 0x12, 0x34, 0x56]),
            Event::Receive(4),
            Event::Deselect,
        ]);
        assert_eq!(log.events(), expected);
    }

    #[test]
    fn test_read_failure_deselects() {
        for (tx, rx) in [(Some(0), None), (None, Some(0))] {
            let log = Log::default();
            let mut bus = MockBus::new(&log);
            bus.fail_transmit = tx;
            bus.fail_receive = rx;
            let mut gpio = MockGpio::new(&log);
            let mut buf = [0u8; 8];
            let err = read_into(&mut device(&mut bus, &mut gpio), 0, &mut buf);
            assert_eq!(err, Err(Error::Communication(BusError::Timeout)));
            assert_eq!(log.count(&Event::Select), 1);
            assert_eq!(log.count(&Event::Deselect), 1);
            log.assert_cs_paired();
        }
    }

    #[test]
    fn test_read_empty_is_noop() {
        let log = Log::default();
        let mut bus = MockBus::new(&log);
        let mut gpio = MockGpio::new(&log);
        read_into(&mut device(&mut bus, &mut gpio), 0, &mut []).unwrap();
        assert!(log.events().is_empty());
    }
}
