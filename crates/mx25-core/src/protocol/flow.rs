//! Multi-command flows built on the primitives
//!
//! None of these are needed to drive the chip; they bundle the polling and
//! page splitting every caller of the primitives ends up writing.

use super::commands::{page_program, read_into, read_status};
use crate::chip;
use crate::device::Device;
use crate::error::{Error, ParameterError, Result};
use crate::spi::Status;
use crate::transport::{Delay, GpioOutput, SpiBus};

/// Poll interval after a page program (typ. 0.5 ms, max 3 ms)
pub const PAGE_PROGRAM_POLL_US: u32 = 10;
/// Polling budget after a page program
pub const PAGE_PROGRAM_TIMEOUT_US: u32 = 10_000;
/// Poll interval after a chip erase
pub const CHIP_ERASE_POLL_US: u32 = 100_000;
/// Polling budget after a chip erase (MX25V8035F max is 10 s)
pub const CHIP_ERASE_TIMEOUT_US: u32 = 20_000_000;

/// Read-back chunk used by [`verify`]
const VERIFY_CHUNK_SIZE: usize = 256;

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls the status register, sleeping `poll_delay_us` between reads, and
/// gives up with [`Error::Timeout`] after roughly `timeout_us`.
pub fn wait_ready<B, G, D>(
    dev: &mut Device<'_, B, G>,
    delay: &mut D,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
    D: Delay + ?Sized,
{
    let max_polls = if poll_delay_us > 0 {
        (timeout_us / poll_delay_us).max(1)
    } else {
        timeout_us.max(1)
    };

    for _ in 0..max_polls {
        let status = Status::from(read_status(dev)?);
        if !status.is_busy() {
            return Ok(());
        }
        if poll_delay_us > 0 {
            delay.delay_us(poll_delay_us);
        }
    }

    log::warn!("mx25: chip still busy after {} us", timeout_us);
    Err(Error::Timeout)
}

/// Callback for progress reporting during [`program`]
pub trait WriteProgress {
    /// Called after each page has been programmed and the chip is ready
    fn write_progress(&mut self, bytes_written: usize);
}

/// A no-op progress reporter
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl WriteProgress for NoProgress {
    fn write_progress(&mut self, _bytes_written: usize) {}
}

/// Program an arbitrary range, one page at a time
///
/// `data` is split at page boundaries so no chunk wraps inside a page. After
/// each chunk the chip is polled until ready. `*address` advances as each
/// page completes, so on error it points at the first page not written.
/// The target range must already be erased.
pub fn program<B, G, D, P>(
    dev: &mut Device<'_, B, G>,
    delay: &mut D,
    address: &mut u32,
    data: &[u8],
    progress: &mut P,
) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
    D: Delay + ?Sized,
    P: WriteProgress + ?Sized,
{
    if !chip::in_bounds(*address, data.len()) {
        return Err(ParameterError::OutOfBounds {
            address: *address,
            len: data.len(),
        }
        .into());
    }

    let mut written = 0;
    while written < data.len() {
        let room = chip::PAGE_SIZE - chip::page_offset(*address);
        let chunk_len = core::cmp::min(room, data.len() - written);
        page_program(dev, address, &data[written..written + chunk_len])?;
        wait_ready(dev, delay, PAGE_PROGRAM_POLL_US, PAGE_PROGRAM_TIMEOUT_US)?;
        written += chunk_len;
        progress.write_progress(written);
    }

    Ok(())
}

/// Compare flash contents starting at `address` against `expected`
///
/// Reads back in small chunks, so no allocation is needed. Ranges beyond
/// the chip are rejected before any bus activity.
pub fn verify<B, G>(dev: &mut Device<'_, B, G>, address: u32, expected: &[u8]) -> Result<()>
where
    B: SpiBus + ?Sized,
    G: GpioOutput + ?Sized,
{
    if !chip::in_bounds(address, expected.len()) {
        return Err(ParameterError::OutOfBounds {
            address,
            len: expected.len(),
        }
        .into());
    }

    let mut buf = [0u8; VERIFY_CHUNK_SIZE];
    for (index, want) in expected.chunks(VERIFY_CHUNK_SIZE).enumerate() {
        let offset = index * VERIFY_CHUNK_SIZE;
        let chunk_addr = address.wrapping_add(offset as u32);
        let have = &mut buf[..want.len()];
        read_into(dev, chunk_addr, have)?;

        if let Some(pos) = have.iter().zip(want).position(|(a, b)| a != b) {
            return Err(Error::VerifyMismatch {
                address: chunk_addr.wrapping_add(pos as u32),
            });
        }
    }
    Ok(())
}
