//! Benchmark and comparison harness.
//!
//! [`benchmark`] times both transforms and reports per-picture means through a
//! [`ReportSink`]. [`run_demo`] runs them once per picture, shows and saves the
//! results and, when a reference backend is supplied, the per-byte difference
//! against it.
//!
//! Both are reached through the provided methods of
//! [`PixelBackend`](crate::PixelBackend); backends themselves never touch the
//! file system.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use pixbench_core::Image;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{ComputeError, ComputeResult, PixelBackend};

#[cfg(feature = "io")]
pub use demo::{DemoContext, run_demo};

// =============================================================================
// Report lines and sinks
// =============================================================================

/// Timed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// RGB to HSV conversion.
    Hsv,
    /// Box blur.
    Blur,
}

impl Operation {
    /// Label used in report lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hsv => "HSV",
            Self::Blur => "Blur",
        }
    }
}

/// One results-log line.
///
/// Renders as `Average Runtime <Op> With <Backend>, Picture <n>: <s> seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingLine<'a> {
    pub operation: Operation,
    pub backend: &'a str,
    /// 1-based picture number.
    pub picture: usize,
    pub mean: Duration,
}

impl fmt::Display for TimingLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average Runtime {} With {}, Picture {}: {:.6} seconds",
            self.operation.label(),
            self.backend,
            self.picture,
            self.mean.as_secs_f64()
        )
    }
}

/// Destination of benchmark results.
pub trait ReportSink {
    /// Records one line.
    fn record(&mut self, line: &TimingLine<'_>) -> ComputeResult<()>;
}

/// Writes each line, newline-terminated, to any [`Write`].
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn record(&mut self, line: &TimingLine<'_>) -> ComputeResult<()> {
        writeln!(self.writer, "{line}").map_err(ComputeError::Report)?;
        self.writer.flush().map_err(ComputeError::Report)
    }
}

/// Fans every line out to several sinks, in insertion order.
#[derive(Default)]
pub struct TeeSink<'a> {
    sinks: Vec<Box<dyn ReportSink + 'a>>,
}

impl<'a> TeeSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a sink.
    pub fn with(mut self, sink: impl ReportSink + 'a) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ReportSink for TeeSink<'_> {
    fn record(&mut self, line: &TimingLine<'_>) -> ComputeResult<()> {
        for sink in &mut self.sinks {
            sink.record(line)?;
        }
        Ok(())
    }
}

// =============================================================================
// Benchmark
// =============================================================================

/// Benchmark settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkOptions {
    /// Repetitions of each transform per picture.
    pub runs: u32,
    /// Blur radius.
    pub radius: u32,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self { runs: 100, radius: 10 }
    }
}

/// Mean durations for one picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTiming {
    /// 1-based picture number.
    pub picture: usize,
    pub hsv: Duration,
    pub blur: Duration,
}

impl ImageTiming {
    /// Means from accumulated totals; `runs` must be non-zero.
    pub fn from_totals(picture: usize, hsv_total: Duration, blur_total: Duration, runs: u32) -> Self {
        Self { picture, hsv: hsv_total / runs, blur: blur_total / runs }
    }

    /// Report lines for this picture, HSV first.
    pub fn lines<'a>(&self, backend: &'a str) -> [TimingLine<'a>; 2] {
        [
            TimingLine { operation: Operation::Hsv, backend, picture: self.picture, mean: self.hsv },
            TimingLine { operation: Operation::Blur, backend, picture: self.picture, mean: self.blur },
        ]
    }
}

/// Benchmark result of one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub backend: &'static str,
    pub timings: Vec<ImageTiming>,
}

/// Times `options.runs` repetitions of each transform on every input.
pub fn benchmark<B: PixelBackend + ?Sized>(
    backend: &mut B,
    inputs: &[Image],
    options: &BenchmarkOptions,
    sink: &mut dyn ReportSink,
) -> ComputeResult<BenchmarkReport> {
    if options.runs == 0 {
        return Err(ComputeError::InvalidParameter("runs must be at least 1".into()));
    }
    let name = backend.name();
    let mut timings = Vec::with_capacity(inputs.len());

    for (i, image) in inputs.iter().enumerate() {
        let picture = i + 1;
        info!(backend = name, picture, runs = options.runs, "benchmarking");

        let mut hsv_total = Duration::ZERO;
        for _ in 0..options.runs {
            let start = Instant::now();
            let out = backend.convert_color_space(image)?;
            hsv_total += start.elapsed();
            drop(out);
        }

        let mut blur_total = Duration::ZERO;
        for _ in 0..options.runs {
            let start = Instant::now();
            let out = backend.apply_box_blur(image, options.radius)?;
            blur_total += start.elapsed();
            drop(out);
        }

        let timing = ImageTiming::from_totals(picture, hsv_total, blur_total, options.runs);
        for line in timing.lines(name) {
            info!("{line}");
            sink.record(&line)?;
        }
        timings.push(timing);
    }

    Ok(BenchmarkReport { backend: name, timings })
}

// =============================================================================
// Diff
// =============================================================================

/// Difference between a backend's output and the reference output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiffStats {
    /// Largest absolute per-byte difference.
    pub max_abs: u8,
    /// Mean absolute per-byte difference.
    pub mean_abs: f64,
    /// Pixels with at least one differing channel.
    pub differing_pixels: usize,
    pub total_pixels: usize,
}

impl DiffStats {
    pub fn is_identical(&self) -> bool {
        self.max_abs == 0
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max {} mean {:.4} differing {}/{} pixels",
            self.max_abs, self.mean_abs, self.differing_pixels, self.total_pixels
        )
    }
}

/// `custom - reference` with 8-bit saturation, plus absolute-difference stats.
///
/// Rows are compared in parallel.
pub fn saturating_diff(custom: &Image, reference: &Image) -> ComputeResult<(Image, DiffStats)> {
    custom.ensure_same_shape(reference)?;
    let mut diff = custom.zeroed_like(custom.order())?;
    if custom.is_empty() {
        return Ok((diff, DiffStats::default()));
    }

    let stride = custom.stride();
    diff.data_mut()
        .par_chunks_mut(stride)
        .zip(custom.data().par_chunks(stride))
        .zip(reference.data().par_chunks(stride))
        .for_each(|((out, a), b)| {
            for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
                *o = x.saturating_sub(y);
            }
        });

    let channels = custom.channels() as usize;
    let (max_abs, sum, differing) = custom
        .data()
        .par_chunks(channels)
        .zip(reference.data().par_chunks(channels))
        .map(|(a, b)| {
            let mut max = 0u8;
            let mut sum = 0u64;
            for (&x, &y) in a.iter().zip(b) {
                let d = x.abs_diff(y);
                max = max.max(d);
                sum += d as u64;
            }
            (max, sum, usize::from(max > 0))
        })
        .reduce(|| (0, 0, 0), |l, r| (l.0.max(r.0), l.1 + r.1, l.2 + r.2));

    let stats = DiffStats {
        max_abs,
        mean_abs: sum as f64 / custom.size_bytes() as f64,
        differing_pixels: differing,
        total_pixels: custom.pixel_count(),
    };
    debug!(%stats, "diff");
    Ok((diff, stats))
}

// =============================================================================
// Demo
// =============================================================================

#[cfg(feature = "io")]
mod demo {
    use std::fs;
    use std::path::{Path, PathBuf};

    use pixbench_core::Image;
    use pixbench_io::{Format, Viewer};
    use tracing::{info, warn};

    use super::saturating_diff;
    use crate::{BackendKind, ComputeResult, PixelBackend};

    /// Collaborators and settings for [`run_demo`].
    pub struct DemoContext<'a> {
        /// Where images are shown.
        pub viewer: &'a mut dyn Viewer,
        /// Folder receiving `<n>.<name>.<ext>` files; created if missing.
        pub output_dir: PathBuf,
        pub format: Format,
        pub radius: u32,
        /// Backend whose outputs the diffs are taken against.
        pub reference: Option<Box<dyn PixelBackend>>,
    }

    impl<'a> DemoContext<'a> {
        /// PNG output, radius 10, no reference backend.
        pub fn new(viewer: &'a mut dyn Viewer, output_dir: impl Into<PathBuf>) -> Self {
            Self {
                viewer,
                output_dir: output_dir.into(),
                format: Format::Png,
                radius: 10,
                reference: None,
            }
        }

        pub fn with_format(mut self, format: Format) -> Self {
            self.format = format;
            self
        }

        pub fn with_radius(mut self, radius: u32) -> Self {
            self.radius = radius;
            self
        }

        pub fn with_reference(mut self, reference: Box<dyn PixelBackend>) -> Self {
            self.reference = Some(reference);
            self
        }

        fn save(&self, picture: usize, name: &str, image: &Image) -> ComputeResult<()> {
            let path = output_path(&self.output_dir, picture, name, self.format);
            pixbench_io::write(&path, image)?;
            Ok(())
        }
    }

    /// Path of a demo output file: `<dir>/<n>.<name>.<ext>`.
    pub fn output_path(dir: &Path, picture: usize, name: &str, format: Format) -> PathBuf {
        dir.join(format!("{picture}.{name}.{}", format.extension()))
    }

    struct Outputs {
        hsv: Image,
        blurred: Image,
        blurred_hsv: Image,
    }

    fn transform<B: PixelBackend + ?Sized>(backend: &mut B, image: &Image, radius: u32) -> ComputeResult<Outputs> {
        let hsv = backend.convert_color_space(image)?;
        let blurred = backend.apply_box_blur(image, radius)?;
        let blurred_hsv = backend.apply_box_blur(&hsv, radius)?;
        Ok(Outputs { hsv, blurred, blurred_hsv })
    }

    /// Runs both transforms on each picture, shows and saves the results.
    ///
    /// Non-library backends are also diffed against `ctx.reference`; without
    /// one the diff step is skipped with a warning.
    pub fn run_demo<B: PixelBackend + ?Sized>(
        backend: &mut B,
        inputs: &[Image],
        ctx: &mut DemoContext<'_>,
    ) -> ComputeResult<()> {
        fs::create_dir_all(&ctx.output_dir).map_err(pixbench_io::IoError::from)?;

        let compare = backend.kind() != BackendKind::Library;
        if compare && ctx.reference.is_none() {
            warn!(backend = backend.name(), "no reference backend available, skipping diffs");
        }

        for (i, image) in inputs.iter().enumerate() {
            let picture = i + 1;
            info!(backend = backend.name(), picture, "demo");

            let out = transform(backend, image, ctx.radius)?;
            ctx.viewer.show("Original Image", image)?;
            ctx.viewer.show("HSV Image", &out.hsv)?;
            ctx.viewer.show("Blurred Original Image", &out.blurred)?;
            ctx.viewer.show("Blurred HSV Image", &out.blurred_hsv)?;
            ctx.save(picture, "hsvImage", &out.hsv)?;
            ctx.save(picture, "blurredImage", &out.blurred)?;
            ctx.save(picture, "blurredHSVImage", &out.blurred_hsv)?;
            ctx.viewer.wait_dismiss()?;

            let expected = match ctx.reference.as_mut() {
                Some(reference) if compare => Some(transform(reference.as_mut(), image, ctx.radius)?),
                _ => None,
            };
            if let Some(expected) = expected {
                let pairs = [
                    ("Diff HSV Image", "diffHsvImage", &out.hsv, &expected.hsv),
                    ("Diff Blur Image", "diffBlurredImage", &out.blurred, &expected.blurred),
                    ("Diff HSV Blur Image", "diffBlurredHSVImage", &out.blurred_hsv, &expected.blurred_hsv),
                ];
                for (title, name, custom, reference) in pairs {
                    let (diff, stats) = saturating_diff(custom, reference)?;
                    info!(picture, title, %stats, "diff against reference");
                    ctx.viewer.show(title, &diff)?;
                    ctx.save(picture, name, &diff)?;
                }
                ctx.viewer.wait_dismiss()?;
            }
        }
        Ok(())
    }
}
