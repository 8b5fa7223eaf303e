//! Error types for I/O operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Path unreadable or not a decodable image.
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// Encoder rejected the image or the file could not be written.
    #[error("cannot encode {}: {source}", path.display())]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoded pixel layout has no 8-bit counterpart.
    #[error("unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    /// Buffer did not form a valid image.
    #[error(transparent)]
    Core(#[from] pixbench_core::Error),

    /// OpenCV call failed.
    #[error("OpenCV error: {0}")]
    OpenCv(String),

    /// Display collaborator failed.
    #[error("display error: {0}")]
    Display(String),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
