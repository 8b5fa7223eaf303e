//! Demo command: show and save results, diff against OpenCV

use crate::DemoArgs;
use crate::config::HarnessConfig;
use anyhow::{Context, Result};
use pixbench_compute::{BackendKind, DemoContext, create_backend};
use pixbench_io::{NullViewer, Viewer};

pub fn run(args: DemoArgs, mut config: HarnessConfig, headless: bool) -> Result<()> {
    if let Some(radius) = args.radius {
        config.radius = radius;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    config.validate()?;

    let kind: BackendKind = args.backend.parse()?;
    let images = super::resolve_images(args.images, &config)?;
    let options = super::backend_options(&config);

    let mut backend = create_backend(kind, &options)
        .with_context(|| format!("Failed to create {} backend", kind.label()))?;
    let reference = if kind != BackendKind::Library && BackendKind::Library.is_available() {
        Some(create_backend(BackendKind::Library, &options).context("Failed to create OpenCV reference backend")?)
    } else {
        None
    };

    let mut viewer = make_viewer(headless);
    let output_dir = config.output_dir.join(kind.label());
    let mut ctx = DemoContext::new(viewer.as_mut(), &output_dir)
        .with_format(config.output_format()?)
        .with_radius(config.radius);
    if let Some(reference) = reference {
        ctx = ctx.with_reference(reference);
    }

    backend
        .run_demo(&images, &mut ctx)
        .with_context(|| format!("{} demo failed", kind.label()))?;

    println!("Processed {} image(s) with {}", images.len(), backend.name());
    println!("Results saved to {}", output_dir.display());
    Ok(())
}

#[cfg(feature = "opencv")]
fn make_viewer(headless: bool) -> Box<dyn Viewer> {
    if headless {
        Box::new(NullViewer::new())
    } else {
        Box::new(pixbench_io::HighGuiViewer::new())
    }
}

#[cfg(not(feature = "opencv"))]
fn make_viewer(headless: bool) -> Box<dyn Viewer> {
    if !headless {
        tracing::info!("built without opencv: images are saved but not displayed");
    }
    Box::new(NullViewer::new())
}
