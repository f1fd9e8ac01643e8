//! Probe command implementation

use crate::programmers::FlashDevice;
use mx25_core::{chip, protocol};

/// Read the ID pair and check it against the MX25V8035F
pub fn run_probe(dev: &mut FlashDevice<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let (manufacturer, device) = protocol::read_id(dev)?;
    println!("ID: {:02X} {:02X}", manufacturer, device);

    protocol::verify_id(dev)?;

    println!("Found flash chip:");
    println!("  Vendor: {}", chip::VENDOR);
    println!("  Name:   {}", chip::NAME);
    println!(
        "  Size:   {} bytes ({} KiB)",
        chip::TOTAL_SIZE,
        chip::TOTAL_SIZE / 1024
    );
    Ok(())
}
