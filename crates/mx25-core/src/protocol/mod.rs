//! MX25 command sequences
//!
//! This module implements the chip's command set on top of a [`Device`].
//! The primitives in `commands` map one-to-one onto chip commands; `flow`
//! builds multi-page programming, ready polling and verification on top of
//! them.
//!
//! [`Device`]: crate::Device

mod commands;
mod flow;

pub use commands::*;
pub use flow::*;
