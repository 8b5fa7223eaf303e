//! pixbench - compare RGB-to-HSV and box blur across CPU, GPU and OpenCV
//!
//! `demo` shows and saves each backend's results and its difference against
//! OpenCV; `bench` appends mean runtimes to the results log.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pixbench_compute::ComputeError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::HarnessConfig;

#[derive(Parser)]
#[command(name = "pixbench")]
#[command(author, version, about = "Benchmark CPU / GPU / OpenCV pixel transforms")]
#[command(long_about = "
Runs RGB->HSV conversion and box blur on three interchangeable backends
and compares their outputs and runtimes.

Examples:
  pixbench backends                         # List available backends
  pixbench demo -b gpu images/1.kitten.jpg  # Show and save GPU results
  pixbench demo -b cpu -r 5 -o out a.png    # Radius 5, write to out/CPU
  pixbench bench -n 10 a.png b.png          # 10 runs on every backend
  pixbench -c pixbench.yaml bench -b opencv # Images and settings from YAML
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// WGSL kernel replacing the bundled GPU kernel
    #[arg(long, global = true)]
    kernel: Option<PathBuf>,

    /// Do not open windows; only log what would be shown
    #[arg(long, global = true)]
    headless: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both transforms once per image, show and save the results
    Demo(DemoArgs),

    /// Time both transforms and append mean runtimes to the results log
    #[command(visible_alias = "b")]
    Bench(BenchArgs),

    /// List backends and whether this machine supports them
    Backends,
}

#[derive(Args)]
struct DemoArgs {
    /// Backend: cpu, gpu, opencv
    #[arg(short, long, default_value = "cpu")]
    backend: String,

    /// Blur radius
    #[arg(short, long)]
    radius: Option<u32>,

    /// Output root (results go to <out>/<CPU|GPU|OpenCV>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: png, jpg
    #[arg(short, long)]
    format: Option<String>,

    /// Input images (default: from the config file)
    images: Vec<PathBuf>,
}

#[derive(Args)]
struct BenchArgs {
    /// Backend: cpu, gpu, opencv, all
    #[arg(short, long, default_value = "all")]
    backend: String,

    /// Repetitions of each transform per image
    #[arg(short = 'n', long)]
    runs: Option<u32>,

    /// Blur radius
    #[arg(short, long)]
    radius: Option<u32>,

    /// Results log (appended)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Input images (default: from the config file)
    images: Vec<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if cli.kernel.is_some() {
        config.kernel = cli.kernel;
    }

    match cli.command {
        Commands::Demo(args) => commands::demo::run(args, config, cli.headless),
        Commands::Bench(args) => commands::bench::run(args, config),
        Commands::Backends => commands::backends::run(cli.verbose),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(setup) = err.downcast_ref::<ComputeError>().filter(|e| e.is_setup()) {
                eprintln!("Backend setup failed:\n{setup}");
            }
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
