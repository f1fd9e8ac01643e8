//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

const PROGRAMMER_HELP: &str =
    "Programmer to use, as name[:key=value,...] (see list-programmers)";

#[derive(Parser)]
#[command(name = "mx25flash")]
#[command(author, version, about = "MX25V8035F SPI NOR flash tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Per-transfer bus timeout in milliseconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and check the manufacturer/device ID
    Probe {
        #[arg(short, long, help = PROGRAMMER_HELP)]
        programmer: String,
    },

    /// Show the status register
    Status {
        #[arg(short, long, help = PROGRAMMER_HELP)]
        programmer: String,
    },

    /// Read flash contents to file
    Read {
        #[arg(short, long, help = PROGRAMMER_HELP)]
        programmer: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (hex with 0x prefix, or decimal)
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        start: u32,

        /// Number of bytes to read (default: up to the end of the chip)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,

        /// Issue write-enable before every read command
        #[arg(long)]
        write_enable: bool,
    },

    /// Write file to flash
    Write {
        #[arg(short, long, help = PROGRAMMER_HELP)]
        programmer: String,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Start address (hex with 0x prefix, or decimal)
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        start: u32,

        /// Skip read-back verification
        #[arg(long)]
        no_verify: bool,

        /// Don't erase the chip before writing
        #[arg(long)]
        no_erase: bool,
    },

    /// Erase the whole chip
    Erase {
        #[arg(short, long, help = PROGRAMMER_HELP)]
        programmer: String,

        /// Return once the erase is started instead of waiting for it
        #[arg(long)]
        no_wait: bool,
    },

    /// List supported programmers
    ListProgrammers,
}
