//! Interchangeable pixel-transform backends for pixbench.
//!
//! Three backends implement the same two transforms, RGB to 8-bit HSV and a
//! clamp-to-edge box blur, so their outputs and timings can be compared:
//!
//! ```text
//! PixelBackend (trait, provided benchmark/run_demo)
//!     +-- ScalarBackend   (sequential reference loops)
//!     +-- DeviceBackend   (wgpu compute kernel)
//!     +-- LibraryBackend  (OpenCV imgproc)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pixbench_compute::{BackendKind, BackendOptions, create_backend};
//!
//! let mut backend = create_backend(BackendKind::Device, &BackendOptions::default())?;
//! let hsv = backend.convert_color_space(&img)?;
//! let blurred = backend.apply_box_blur(&img, 10)?;
//! ```

pub mod backend;
pub mod blur;
pub mod harness;
pub mod hsv;
mod shaders;

pub use backend::{
    BackendInfo, BackendKind, BackendOptions, PixelBackend, ScalarBackend, WorkGroupLimits,
    WorkGroupShape, create_backend, describe_backends, detect_backends,
};
pub use blur::MAX_BLUR_RADIUS;
pub use harness::{
    BenchmarkOptions, BenchmarkReport, DiffStats, ImageTiming, Operation, ReportSink, TeeSink,
    TimingLine, WriterSink,
};

#[cfg(feature = "io")]
pub use harness::DemoContext;

#[cfg(feature = "wgpu")]
pub use backend::{DeviceBackend, DeviceBuffers};

#[cfg(feature = "opencv")]
pub use backend::LibraryBackend;

use std::path::PathBuf;
use thiserror::Error;

/// Backend and harness errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Failed to compile shader: {0}")]
    ShaderCompilation(String),

    #[error("Cannot read kernel source {}: {source}", path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Image too large: {width}x{height} exceeds GPU {what} limit {limit}")]
    ImageTooLarge { width: u32, height: u32, what: &'static str, limit: u64 },

    #[error("Empty image")]
    EmptyImage,

    #[error("Unsupported channel count {0} (need at least 3)")]
    UnsupportedChannels(u32),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error(transparent)]
    Core(#[from] pixbench_core::Error),

    #[cfg(feature = "io")]
    #[error(transparent)]
    Io(#[from] pixbench_io::IoError),

    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

impl ComputeError {
    /// True for errors raised while constructing a backend.
    ///
    /// These are fatal for the process: there is nothing to retry.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::NoAdapter | Self::DeviceCreation(_) | Self::ShaderCompilation(_) | Self::KernelSource { .. }
        )
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors() {
        assert!(ComputeError::NoAdapter.is_setup());
        assert!(ComputeError::ShaderCompilation("bad".into()).is_setup());
        let missing = ComputeError::KernelSource {
            path: "k.wgsl".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(missing.is_setup());
        assert!(missing.to_string().contains("k.wgsl"));

        assert!(!ComputeError::EmptyImage.is_setup());
        assert!(!ComputeError::InvalidParameter("runs".into()).is_setup());
    }
}
