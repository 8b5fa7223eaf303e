//! CLI command implementations

pub mod backends;
pub mod bench;
pub mod demo;

use anyhow::{Context, Result, bail};
use pixbench_compute::{BackendKind, BackendOptions};
use pixbench_core::Image;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::HarnessConfig;

/// Load image from path
pub fn load_image(path: &Path) -> Result<Image> {
    pixbench_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Images named on the command line, else those listed in the config.
pub fn resolve_images(cli_images: Vec<PathBuf>, config: &HarnessConfig) -> Result<Vec<Image>> {
    let paths = if cli_images.is_empty() { config.image_paths() } else { cli_images };
    if paths.is_empty() {
        bail!("No input images: pass them on the command line or list them under `images:` in the config");
    }
    paths.iter().map(|p| load_image(p)).collect()
}

pub fn backend_options(config: &HarnessConfig) -> BackendOptions {
    BackendOptions { kernel_path: config.kernel.clone() }
}

/// Parses `cpu`, `gpu`, `opencv` or `all`; `all` keeps only available backends.
pub fn parse_backends(name: &str) -> Result<Vec<BackendKind>> {
    if name.eq_ignore_ascii_case("all") {
        let mut kinds = Vec::new();
        for kind in BackendKind::ALL {
            if kind.is_available() {
                kinds.push(kind);
            } else {
                warn!(backend = kind.label(), "not available, skipping");
            }
        }
        return Ok(kinds);
    }
    Ok(vec![name.parse::<BackendKind>()?])
}
