//! OpenCV backend: the ground-truth oracle.

use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
    prelude::*,
};
use pixbench_core::{ChannelOrder, Image};
use pixbench_io::cv;
use tracing::trace;

use super::{BackendKind, PixelBackend};
use crate::{ComputeError, ComputeResult, blur, hsv};

fn cv_failed(what: &'static str) -> impl FnOnce(opencv::Error) -> ComputeError {
    move |e| ComputeError::OperationFailed(format!("Failed to {what}: {e:?}"))
}

/// Backend delegating to `imgproc::cvt_color` and `imgproc::filter_2d`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryBackend;

impl LibraryBackend {
    /// Create new OpenCV backend.
    pub fn new() -> Self {
        Self
    }
}

impl PixelBackend for LibraryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Library
    }

    fn convert_color_space(&mut self, input: &Image) -> ComputeResult<Image> {
        let order = hsv::output_order(input)?;
        trace!(width = input.width(), height = input.height(), "library::convert_color_space");

        // COLOR_RGB2HSV takes three channels; alpha is re-attached afterwards.
        let rgb = if input.order().has_alpha() { drop_alpha(input)? } else { input.clone() };
        let src = cv::image_to_mat(&rgb)?;
        let mut dst = Mat::default();
        imgproc::cvt_color(&src, &mut dst, imgproc::COLOR_RGB2HSV, 0).map_err(cv_failed("convert RGB to HSV"))?;
        let converted = cv::mat_to_image(&dst, ChannelOrder::Hsv)?;

        if order == ChannelOrder::Hsva {
            restore_alpha(&converted, input)
        } else {
            Ok(converted)
        }
    }

    fn apply_box_blur(&mut self, input: &Image, radius: u32) -> ComputeResult<Image> {
        blur::validate(input, radius)?;
        trace!(width = input.width(), height = input.height(), radius, "library::apply_box_blur");

        let side = (2 * radius + 1) as i32;
        let kernel = Mat::new_rows_cols_with_default(
            side,
            side,
            core::CV_32F,
            Scalar::all(1.0 / blur::window_area(radius) as f64),
        )
        .map_err(cv_failed("create blur kernel"))?;

        let src = cv::image_to_mat(input)?;
        let mut dst = Mat::default();
        imgproc::filter_2d(
            &src,
            &mut dst,
            -1,
            &kernel,
            Point::new(-1, -1),
            0.0,
            core::BORDER_REPLICATE,
        )
        .map_err(cv_failed("filter image"))?;

        Ok(cv::mat_to_image(&dst, input.order())?)
    }
}

fn drop_alpha(input: &Image) -> ComputeResult<Image> {
    let c = input.channels() as usize;
    let data = input
        .data()
        .chunks_exact(c)
        .flat_map(|px| px[..3].iter().copied())
        .collect();
    Ok(Image::from_raw(data, input.width(), input.height(), ChannelOrder::Rgb)?)
}

fn restore_alpha(hsv: &Image, source: &Image) -> ComputeResult<Image> {
    let data = hsv
        .data()
        .chunks_exact(3)
        .zip(source.data().chunks_exact(4))
        .flat_map(|(h, s)| [h[0], h[1], h[2], s[3]])
        .collect();
    Ok(Image::from_raw(data, hsv.width(), hsv.height(), ChannelOrder::Hsva)?)
}
