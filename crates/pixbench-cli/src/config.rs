//! Harness configuration file.
//!
//! ```yaml
//! images_dir: images
//! images:
//!   - animal/1.kitten_small.jpg
//!   - animal/2.kitten_medium.jpg
//! radius: 10
//! runs: 100
//! output_dir: results
//! results_log: runtimeEvaluation.txt
//! format: png
//! kernel: kernels/pixel_ops.wgsl
//! ```
//!
//! Every field is optional; command-line flags override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use pixbench_compute::MAX_BLUR_RADIUS;
use pixbench_io::Format;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory the `images` entries are relative to.
    pub images_dir: Option<PathBuf>,
    pub images: Vec<PathBuf>,
    pub radius: u32,
    pub runs: u32,
    /// Demo output root; each backend writes to its own sub-folder.
    pub output_dir: PathBuf,
    pub results_log: PathBuf,
    /// Demo output format (`png`, `jpg`).
    pub format: String,
    /// WGSL kernel replacing the bundled one.
    pub kernel: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            images_dir: None,
            images: Vec::new(),
            radius: 10,
            runs: 100,
            output_dir: PathBuf::from("results"),
            results_log: PathBuf::from("runtimeEvaluation.txt"),
            format: "png".to_string(),
            kernel: None,
        }
    }
}

impl HarnessConfig {
    /// Loads a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Rejects values no command can run with.
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            bail!("runs must be at least 1");
        }
        if self.radius > MAX_BLUR_RADIUS {
            bail!("radius {} exceeds maximum {}", self.radius, MAX_BLUR_RADIUS);
        }
        self.output_format()?;
        Ok(())
    }

    pub fn output_format(&self) -> Result<Format> {
        match Format::from_name(&self.format) {
            Some(format) => Ok(format),
            None => bail!("unknown output format '{}' (expected png or jpg)", self.format),
        }
    }

    /// `images`, resolved against `images_dir`.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        match &self.images_dir {
            Some(dir) => self.images.iter().map(|p| dir.join(p)).collect(),
            None => self.images.clone(),
        }
    }
}
