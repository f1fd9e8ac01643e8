//! mx25flash - Command-line tool for the Macronix MX25V8035F
//!
//! Opens a programmer (an SPI bus plus a GPIO chip select line), wraps it in
//! an [`mx25_core::Device`] and runs one command against it.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use programmers::{open_programmer, FlashDevice};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {}
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let timeout = Duration::from_millis(cli.timeout_ms);

    match cli.command {
        Commands::Probe { programmer } => {
            with_device(&programmer, timeout, false, commands::run_probe)
        }
        Commands::Status { programmer } => {
            with_device(&programmer, timeout, false, commands::run_status)
        }
        Commands::Read {
            programmer,
            output,
            start,
            length,
            write_enable,
        } => with_device(&programmer, timeout, write_enable, |dev| {
            commands::run_read(dev, &output, start, length)
        }),
        Commands::Write {
            programmer,
            input,
            start,
            no_verify,
            no_erase,
        } => with_device(&programmer, timeout, false, |dev| {
            commands::run_write(dev, &input, start, !no_verify, no_erase)
        }),
        Commands::Erase {
            programmer,
            no_wait,
        } => with_device(&programmer, timeout, false, |dev| {
            commands::run_erase(dev, no_wait)
        }),
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    }
}

/// Open `programmer` and run `f` against a device handle on it
fn with_device<F>(
    programmer: &str,
    timeout: Duration,
    write_enable_before_read: bool,
    f: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut FlashDevice<'_>) -> Result<(), Box<dyn std::error::Error>>,
{
    let mut handle = open_programmer(programmer)?;
    let mut dev = handle
        .device(timeout)
        .with_write_enable_before_read(write_enable_before_read);
    f(&mut dev)
}
