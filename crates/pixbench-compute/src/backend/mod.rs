//! Pixel-transform backends.
//!
//! Every backend supplies the same two transforms; the benchmark and demo
//! drivers are provided methods of [`PixelBackend`] so they run unchanged on
//! each variant.
//!
//! # Architecture
//!
//! ```text
//! create_backend(BackendKind, &BackendOptions) -> Box<dyn PixelBackend>
//!     +-- ScalarBackend   (nested loops, no threads)
//!     +-- DeviceBackend   (wgpu: buffers, override work-group, dispatch, read-back)
//!     +-- LibraryBackend  (OpenCV cvt_color / filter_2d)
//! ```

mod detect;
mod scalar;
mod workgroup;

#[cfg(feature = "wgpu")]
mod device;

#[cfg(feature = "opencv")]
mod library;

pub use detect::{BackendInfo, describe_backends, detect_backends};
pub use scalar::ScalarBackend;
pub use workgroup::{WorkGroupLimits, WorkGroupShape};

#[cfg(feature = "wgpu")]
pub use device::{DeviceBackend, DeviceBuffers};

#[cfg(feature = "opencv")]
pub use library::LibraryBackend;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use pixbench_core::Image;

use crate::harness::{self, BenchmarkOptions, BenchmarkReport, ReportSink};
use crate::{ComputeError, ComputeResult};

#[cfg(feature = "io")]
use crate::harness::DemoContext;

/// Backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Sequential reference implementation.
    Scalar,
    /// GPU compute kernel dispatched through wgpu.
    Device,
    /// OpenCV imgproc.
    Library,
}

impl BackendKind {
    /// All variants, in menu order.
    pub const ALL: [BackendKind; 3] = [Self::Scalar, Self::Device, Self::Library];

    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Scalar => true,
            #[cfg(feature = "wgpu")]
            Self::Device => DeviceBackend::is_available(),
            #[cfg(not(feature = "wgpu"))]
            Self::Device => false,
            Self::Library => cfg!(feature = "opencv"),
        }
    }

    /// Label used in the results log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar => "CPU",
            Self::Device => "GPU",
            Self::Library => "OpenCV",
        }
    }

    /// Lower-case name accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "cpu",
            Self::Device => "gpu",
            Self::Library => "opencv",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" | "scalar" => Ok(Self::Scalar),
            "gpu" | "device" | "wgpu" => Ok(Self::Device),
            "opencv" | "library" => Ok(Self::Library),
            other => Err(ComputeError::InvalidParameter(format!(
                "unknown backend '{other}' (expected cpu, gpu or opencv)"
            ))),
        }
    }
}

/// Construction options shared by all backends.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// WGSL file replacing the bundled device kernel.
    pub kernel_path: Option<PathBuf>,
}

/// Common interface of the three backends.
///
/// Transforms take `&mut self`: a backend owns at most one device queue and
/// must not be driven from two threads at once.
pub trait PixelBackend {
    /// Variant tag.
    fn kind(&self) -> BackendKind;

    /// Results-log label (`CPU`, `GPU`, `OpenCV`).
    fn name(&self) -> &'static str {
        self.kind().label()
    }

    /// Converts an RGB(A) image to 8-bit HSV(A).
    ///
    /// Fails with [`ComputeError::EmptyImage`] on an empty input and
    /// [`ComputeError::UnsupportedChannels`] below three channels.
    fn convert_color_space(&mut self, input: &Image) -> ComputeResult<Image>;

    /// Box-blurs every channel over a `(2*radius+1)^2` clamp-to-edge window.
    fn apply_box_blur(&mut self, input: &Image, radius: u32) -> ComputeResult<Image>;

    /// Times both transforms `options.runs` times per input and reports the means.
    fn benchmark(
        &mut self,
        inputs: &[Image],
        options: &BenchmarkOptions,
        sink: &mut dyn ReportSink,
    ) -> ComputeResult<BenchmarkReport> {
        harness::benchmark(self, inputs, options, sink)
    }

    /// Runs both transforms on each input, shows and saves the results and
    /// their difference against the reference backend.
    #[cfg(feature = "io")]
    fn run_demo(&mut self, inputs: &[Image], ctx: &mut DemoContext<'_>) -> ComputeResult<()> {
        harness::run_demo(self, inputs, ctx)
    }
}

/// Create a backend instance.
///
/// Feature-gated variants return [`ComputeError::BackendNotAvailable`] when
/// the crate was built without them.
pub fn create_backend(kind: BackendKind, options: &BackendOptions) -> ComputeResult<Box<dyn PixelBackend>> {
    match kind {
        BackendKind::Scalar => Ok(Box::new(ScalarBackend::new())),
        BackendKind::Device => {
            #[cfg(feature = "wgpu")]
            {
                Ok(Box::new(DeviceBackend::new(options)?))
            }
            #[cfg(not(feature = "wgpu"))]
            {
                let _ = options;
                Err(ComputeError::BackendNotAvailable("wgpu feature not enabled".to_string()))
            }
        }
        BackendKind::Library => {
            #[cfg(feature = "opencv")]
            {
                Ok(Box::new(LibraryBackend::new()))
            }
            #[cfg(not(feature = "opencv"))]
            {
                Err(ComputeError::BackendNotAvailable("opencv feature not enabled".to_string()))
            }
        }
    }
}
