//! # pixbench-core
//!
//! Core types shared by every pixbench crate.
//!
//! - [`Image`] - Owned 8-bit, row-major, channel-interleaved pixel buffer
//! - [`ChannelOrder`] - What the interleaved channels mean (RGB, HSV, ...)
//! - [`Error`] / [`Result`] - Buffer construction and access errors
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. Everything else builds on it:
//!
//! ```text
//! pixbench-core (this crate)
//!    ^
//!    |
//!    +-- pixbench-io (decode / encode / display)
//!    +-- pixbench-compute (backends + harness)
//!    +-- pixbench-cli
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::{ChannelOrder, Image, BYTE_DEPTH};
