//! Write command implementation

use super::{bytes_bar, erase::erase_chip, spinner};
use crate::programmers::FlashDevice;
use indicatif::ProgressBar;
use mx25_core::protocol::{self, WriteProgress};
use mx25_core::transport::StdDelay;
use mx25_core::{chip, Error, ParameterError};
use std::path::Path;

/// Progress reporter driving an indicatif bar
struct IndicatifProgress {
    bar: ProgressBar,
}

impl WriteProgress for IndicatifProgress {
    fn write_progress(&mut self, bytes_written: usize) {
        self.bar.set_position(bytes_written as u64);
    }
}

/// Run the write command
pub fn run_write(
    dev: &mut FlashDevice<'_>,
    input: &Path,
    start: u32,
    do_verify: bool,
    no_erase: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    protocol::verify_id(dev)?;

    let data = std::fs::read(input)?;
    println!("Read {} bytes from {:?}", data.len(), input);

    if data.is_empty() {
        return Err(Error::from(ParameterError::EmptyData).into());
    }
    if !chip::in_bounds(start, data.len()) {
        return Err(format!(
            "File size ({} bytes) at 0x{:06X} exceeds chip size ({} bytes)",
            data.len(),
            start,
            chip::TOTAL_SIZE
        )
        .into());
    }

    if no_erase {
        log::warn!("Skipping erase; programming can only clear bits");
    } else {
        erase_chip(dev, true)?;
    }

    let mut progress = IndicatifProgress {
        bar: bytes_bar(data.len() as u64, "Writing"),
    };
    let mut address = start;
    let result = protocol::program(dev, &mut StdDelay, &mut address, &data, &mut progress);
    if let Err(e) = result {
        progress
            .bar
            .abandon_with_message(format!("Write stopped at 0x{:06X}", address));
        return Err(e.into());
    }
    progress.bar.finish_with_message("Write complete");

    if do_verify {
        let pb = spinner("Verifying...");
        match protocol::verify(dev, start, &data) {
            Ok(()) => pb.finish_with_message("Verify complete"),
            Err(e) => {
                pb.abandon_with_message("Verify failed");
                return Err(e.into());
            }
        }
    }

    println!("Wrote {} bytes at 0x{:06X}", data.len(), start);
    Ok(())
}
