//! Bench command: time every selected backend, append to the results log

use crate::BenchArgs;
use crate::config::HarnessConfig;
use anyhow::{Context, Result, bail};
use pixbench_compute::{BenchmarkOptions, TeeSink, WriterSink, create_backend};
use std::fs::OpenOptions;
use std::io;
use tracing::debug;

pub fn run(args: BenchArgs, mut config: HarnessConfig) -> Result<()> {
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(radius) = args.radius {
        config.radius = radius;
    }
    if let Some(log) = args.log {
        config.results_log = log;
    }
    config.validate()?;

    let kinds = super::parse_backends(&args.backend)?;
    if kinds.is_empty() {
        bail!("No backend available");
    }
    let images = super::resolve_images(args.images, &config)?;
    let options = super::backend_options(&config);
    let bench_options = BenchmarkOptions { runs: config.runs, radius: config.radius };

    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.results_log)
        .with_context(|| format!("Failed to open results log: {}", config.results_log.display()))?;
    let mut sink = TeeSink::new().with(WriterSink::new(io::stdout())).with(WriterSink::new(log));

    for kind in kinds {
        let mut backend = create_backend(kind, &options)
            .with_context(|| format!("Failed to create {} backend", kind.label()))?;
        let report = backend
            .benchmark(&images, &bench_options, &mut sink)
            .with_context(|| format!("{} benchmark failed", kind.label()))?;
        debug!(backend = report.backend, pictures = report.timings.len(), "benchmark done");
    }

    println!("Results appended to {}", config.results_log.display());
    Ok(())
}
