//! CLI command implementations
//!
//! Every command runs against a [`FlashDevice`](crate::programmers::FlashDevice)
//! borrowed from an opened programmer.

mod erase;
mod list;
mod probe;
mod read;
mod status;
mod write;

pub use erase::run_erase;
pub use list::list_programmers;
pub use probe::run_probe;
pub use read::run_read;
pub use status::run_status;
pub use write::run_write;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Byte progress bar in the style shared by read and write
fn bytes_bar(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Spinner for operations without byte-level progress
fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
