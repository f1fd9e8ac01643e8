//! Erase command implementation

use super::spinner;
use crate::programmers::FlashDevice;
use mx25_core::protocol::{self, CHIP_ERASE_POLL_US, CHIP_ERASE_TIMEOUT_US};
use mx25_core::transport::StdDelay;

/// Start a chip erase and, unless `no_wait`, poll until it completes
pub fn run_erase(dev: &mut FlashDevice<'_>, no_wait: bool) -> Result<(), Box<dyn std::error::Error>> {
    protocol::verify_id(dev)?;
    erase_chip(dev, !no_wait)?;
    if no_wait {
        println!("Chip erase started; the chip stays busy until WIP clears");
    } else {
        println!("Chip erased");
    }
    Ok(())
}

/// Issue a chip erase, optionally waiting for it with a spinner
pub(super) fn erase_chip(
    dev: &mut FlashDevice<'_>,
    wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    protocol::chip_erase(dev)?;
    if !wait {
        return Ok(());
    }

    let pb = spinner("Erasing chip...");
    let result = protocol::wait_ready(dev, &mut StdDelay, CHIP_ERASE_POLL_US, CHIP_ERASE_TIMEOUT_US);
    match result {
        Ok(()) => pb.finish_with_message("Erase complete"),
        Err(_) => pb.abandon_with_message("Erase did not complete"),
    }
    result.map_err(Into::into)
}
