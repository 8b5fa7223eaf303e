//! Display collaborator.
//!
//! The harness calls [`Viewer::show`] for every image it wants a human to look
//! at and then [`Viewer::wait_dismiss`] once per group, which blocks until the
//! windows are dismissed.

use pixbench_core::Image;
use tracing::info;

use crate::IoResult;

/// Something that can put images in front of a user.
pub trait Viewer {
    /// Queues `image` for display under `title`.
    fn show(&mut self, title: &str, image: &Image) -> IoResult<()>;

    /// Blocks until every shown window is dismissed, then closes them.
    fn wait_dismiss(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Headless viewer: logs what would have been shown and never blocks.
#[derive(Debug, Default)]
pub struct NullViewer {
    shown: Vec<String>,
    dismissals: usize,
}

impl NullViewer {
    /// Creates a headless viewer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles passed to [`Viewer::show`] so far, in order.
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    /// Number of [`Viewer::wait_dismiss`] calls so far.
    pub fn dismissals(&self) -> usize {
        self.dismissals
    }
}

impl Viewer for NullViewer {
    fn show(&mut self, title: &str, image: &Image) -> IoResult<()> {
        info!(title, width = image.width(), height = image.height(), "show (headless)");
        self.shown.push(title.to_string());
        Ok(())
    }

    fn wait_dismiss(&mut self) -> IoResult<()> {
        self.dismissals += 1;
        Ok(())
    }
}

#[cfg(feature = "opencv")]
pub use highgui_viewer::HighGuiViewer;

#[cfg(feature = "opencv")]
mod highgui_viewer {
    use opencv::highgui;
    use pixbench_core::Image;

    use super::Viewer;
    use crate::{IoError, IoResult, cv};

    /// OpenCV highgui windows; `wait_dismiss` waits for any key.
    #[derive(Debug, Default)]
    pub struct HighGuiViewer {
        open: usize,
    }

    impl HighGuiViewer {
        /// Creates a viewer with no open windows.
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Viewer for HighGuiViewer {
        fn show(&mut self, title: &str, image: &Image) -> IoResult<()> {
            let mat = cv::image_to_display_mat(image)?;
            highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
                .map_err(|e| IoError::Display(format!("Failed to create window {title}: {e:?}")))?;
            highgui::imshow(title, &mat)
                .map_err(|e| IoError::Display(format!("Failed to show {title}: {e:?}")))?;
            self.open += 1;
            Ok(())
        }

        fn wait_dismiss(&mut self) -> IoResult<()> {
            if self.open == 0 {
                return Ok(());
            }
            highgui::wait_key(0)
                .map_err(|e| IoError::Display(format!("Failed to wait for key: {e:?}")))?;
            highgui::destroy_all_windows()
                .map_err(|e| IoError::Display(format!("Failed to close windows: {e:?}")))?;
            self.open = 0;
            Ok(())
        }
    }
}
