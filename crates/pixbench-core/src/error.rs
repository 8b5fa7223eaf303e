//! Error types for pixbench-core operations.
//!
//! # Usage
//!
//! ```rust
//! use pixbench_core::{ChannelOrder, Error, Image};
//!
//! let err = Image::from_raw(vec![0u8; 5], 2, 1, ChannelOrder::Rgb).unwrap_err();
//! assert!(matches!(err, Error::BufferSizeMismatch { expected: 6, actual: 5 }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or addressing an [`Image`](crate::Image).
#[derive(Debug, Error)]
pub enum Error {
    /// Raw buffer length does not equal `width * height * channels`.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Channel order does not match the channel count of the buffer.
    ///
    /// An `Rgb` order needs exactly three channels, `Gray` exactly one, etc.
    #[error("channel order {order:?} needs {expected} channels, got {got}")]
    ChannelMismatch {
        /// Requested order
        order: crate::ChannelOrder,
        /// Channels implied by the order
        expected: u32,
        /// Channels supplied
        got: u32,
    },

    /// Channel count outside `1..=4`.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Two images that must agree in shape do not.
    #[error("dimension mismatch: {a_width}x{a_height}x{a_channels} vs {b_width}x{b_height}x{b_channels}")]
    DimensionMismatch {
        /// First image width
        a_width: u32,
        /// First image height
        a_height: u32,
        /// First image channels
        a_channels: u32,
        /// Second image width
        b_width: u32,
        /// Second image height
        b_height: u32,
        /// Second image channels
        b_channels: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OutOfBounds { x: 100, y: 50, width: 80, height: 60 };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("80x60"));
    }
}
