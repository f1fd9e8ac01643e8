//! Read command implementation

use super::bytes_bar;
use crate::programmers::FlashDevice;
use mx25_core::{chip, protocol, Error, ParameterError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn run_read(
    dev: &mut FlashDevice<'_>,
    output: &Path,
    start: u32,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    protocol::verify_id(dev)?;

    let length = length.unwrap_or_else(|| chip::TOTAL_SIZE.saturating_sub(start)) as usize;
    if !chip::in_bounds(start, length) {
        return Err(Error::from(ParameterError::OutOfBounds {
            address: start,
            len: length,
        })
        .into());
    }

    let data = read_flash_with_progress(dev, start, length)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read `length` bytes from `start` with a progress bar
fn read_flash_with_progress(
    dev: &mut FlashDevice<'_>,
    start: u32,
    length: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; length];
    let pb = bytes_bar(length as u64, "Reading");

    for (index, chunk) in data.chunks_mut(READ_CHUNK_SIZE).enumerate() {
        let offset = index * READ_CHUNK_SIZE;
        protocol::read_into(dev, start + offset as u32, chunk)?;
        pb.set_position((offset + chunk.len()) as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
