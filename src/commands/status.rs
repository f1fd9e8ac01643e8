//! Status register command

use crate::programmers::FlashDevice;
use mx25_core::protocol;
use mx25_core::spi::Status;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print the decoded status register
pub fn run_status(dev: &mut FlashDevice<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = protocol::read_status(dev)?;
    let status = Status::from(raw);

    println!("Status register: 0x{:02X}", raw);
    println!("  Write in progress:   {}", yes_no(status.is_busy()));
    println!("  Write enable latch:  {}", yes_no(status.write_enabled()));
    println!("  Block protect:       {}", status.block_protect());
    println!("  Quad enable:         {}", yes_no(status.contains(Status::QE)));
    println!("  SR write disable:    {}", yes_no(status.contains(Status::SRWD)));
    Ok(())
}
