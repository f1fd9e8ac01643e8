//! spidev bus implementation
//!
//! The kernel is told not to drive chip select (`SPI_NO_CS`); the select line
//! is a plain GPIO handled by [`crate::LinuxGpio`]. Each `transmit`/`receive`
//! becomes one or more half-duplex `SPI_IOC_MESSAGE(1)` transfers, split at
//! the spidev buffer size.

use crate::error::{LinuxError, Result};

use mx25_core::transport::{BusError, SpiBus};

use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

/// spidev's `bufsiz` module parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (2 MHz)
pub const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// Mode flag: chip select is not driven by the controller
const SPI_NO_CS: u8 = 0x40;

const BITS_PER_WORD: u8 = 8;

mod ioctl {
    use super::SpiIocTransfer;
    use nix::{ioctl_write_buf, ioctl_write_ptr};

    const SPI_IOC_MAGIC: u8 = b'k';

    ioctl_write_ptr!(wr_mode, SPI_IOC_MAGIC, 1, u8);
    ioctl_write_ptr!(wr_bits_per_word, SPI_IOC_MAGIC, 3, u8);
    ioctl_write_ptr!(wr_max_speed_hz, SPI_IOC_MAGIC, 4, u32);
    // SPI_IOC_MESSAGE(n): the request size encodes the number of transfers
    ioctl_write_buf!(message, SPI_IOC_MAGIC, 0, SpiIocTransfer);
}

/// Kernel `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default, Clone)]
pub(crate) struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

const _: () = assert!(std::mem::size_of::<SpiIocTransfer>() == 32);

impl SpiIocTransfer {
    fn tx(data: &[u8], speed_hz: u32) -> Self {
        Self {
            tx_buf: data.as_ptr() as u64,
            len: data.len() as u32,
            speed_hz,
            bits_per_word: BITS_PER_WORD,
            ..Default::default()
        }
    }

    fn rx(buf: &mut [u8], speed_hz: u32) -> Self {
        Self {
            rx_buf: buf.as_mut_ptr() as u64,
            len: buf.len() as u32,
            speed_hz,
            bits_per_word: BITS_PER_WORD,
            ..Default::default()
        }
    }
}

/// Configuration for opening a spidev node
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz
    pub speed_hz: u32,
    /// SPI mode (0-3); `SPI_NO_CS` is added when the device is opened
    pub mode: u8,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: 0,
        }
    }
}

impl LinuxSpiConfig {
    /// Configuration for `device` at the default speed, mode 0
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }
}

fn os_error(e: nix::errno::Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e as i32)
}

/// Apply mode (with `SPI_NO_CS`), word size and clock to an open spidev fd
fn configure(fd: RawFd, config: &LinuxSpiConfig) -> Result<()> {
    let mode = config.mode | SPI_NO_CS;
    // SAFETY: each call passes a pointer to a live value of the type the
    // request expects.
    unsafe {
        ioctl::wr_mode(fd, &mode).map_err(|e| LinuxError::SetModeFailed {
            mode,
            source: os_error(e),
        })?;
        ioctl::wr_bits_per_word(fd, &BITS_PER_WORD).map_err(|e| {
            LinuxError::SetBitsPerWordFailed {
                bits: BITS_PER_WORD,
                source: os_error(e),
            }
        })?;
        ioctl::wr_max_speed_hz(fd, &config.speed_hz).map_err(|e| LinuxError::SetSpeedFailed {
            speed: config.speed_hz,
            source: os_error(e),
        })?;
    }
    Ok(())
}

/// spidev handle implementing [`SpiBus`]
pub struct LinuxSpi {
    file: File,
    chunk: usize,
    speed_hz: u32,
}

impl LinuxSpi {
    /// Open a spidev node with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxError::NoDevice);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;
        configure(file.as_raw_fd(), config)?;

        let chunk = kernel_buf_size();
        log::info!(
            "linux_spi: Opened {} (mode={}, speed={} kHz, chunk={} bytes)",
            config.device,
            config.mode,
            config.speed_hz / 1000,
            chunk
        );

        Ok(Self {
            file,
            chunk,
            speed_hz: config.speed_hz,
        })
    }

    /// Current clock speed in Hz
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Largest single transfer handed to the kernel
    pub fn max_transfer_len(&self) -> usize {
        self.chunk
    }

    fn submit(&self, transfer: &SpiIocTransfer) -> std::io::Result<()> {
        // SAFETY: the transfer's buffer pointer borrows a slice that outlives
        // this call.
        unsafe { ioctl::message(self.file.as_raw_fd(), std::slice::from_ref(transfer)) }
            .map(drop)
            .map_err(os_error)
    }
}

/// Fail with `Timeout` once a call has run longer than allowed
fn check_deadline(start: Instant, timeout: Duration) -> core::result::Result<(), BusError> {
    let elapsed = start.elapsed();
    if elapsed > timeout {
        log::warn!("linux_spi: Transfer took {:?} (limit {:?})", elapsed, timeout);
        return Err(BusError::Timeout);
    }
    Ok(())
}

fn fault(dir: &str, e: std::io::Error) -> BusError {
    log::error!("linux_spi: {} failed: {}", dir, e);
    BusError::Fault
}

impl SpiBus for LinuxSpi {
    fn transmit(&mut self, data: &[u8], timeout: Duration) -> core::result::Result<(), BusError> {
        let start = Instant::now();
        for chunk in data.chunks(self.chunk) {
            self.submit(&SpiIocTransfer::tx(chunk, self.speed_hz))
                .map_err(|e| fault("Transmit", e))?;
            check_deadline(start, timeout)?;
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> core::result::Result<(), BusError> {
        let start = Instant::now();
        let (chunk_len, speed_hz) = (self.chunk, self.speed_hz);
        for chunk in buf.chunks_mut(chunk_len) {
            self.submit(&SpiIocTransfer::rx(chunk, speed_hz))
                .map_err(|e| fault("Receive", e))?;
            check_deadline(start, timeout)?;
        }
        Ok(())
    }
}

/// spidev `bufsiz`, falling back to the page size
fn kernel_buf_size() -> usize {
    std::fs::read_to_string(BUF_SIZE_SYSFS)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&size| size > 0)
        .unwrap_or_else(|| {
            log::debug!("linux_spi: No usable {}, using page size", BUF_SIZE_SYSFS);
            (unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize).max(1)
        })
}
