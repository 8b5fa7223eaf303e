//! Conversions between [`Image`] and OpenCV `Mat`.

use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
};
use pixbench_core::{ChannelOrder, Image};

use crate::{IoError, IoResult};

fn cv_err(what: &str) -> impl FnOnce(opencv::Error) -> IoError + '_ {
    move |e| IoError::OpenCv(format!("Failed to {what}: {e:?}"))
}

/// OpenCV 8-bit type for a channel count.
pub fn mat_type(channels: u32) -> IoResult<i32> {
    match channels {
        1 => Ok(core::CV_8UC1),
        2 => Ok(core::CV_8UC2),
        3 => Ok(core::CV_8UC3),
        4 => Ok(core::CV_8UC4),
        n => Err(IoError::UnsupportedLayout(format!("{n} channels"))),
    }
}

/// Copies an image into a freshly allocated continuous `Mat`.
pub fn image_to_mat(image: &Image) -> IoResult<Mat> {
    let (width, height, channels) = image.dimensions();
    let mut mat = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        mat_type(channels)?,
        Scalar::all(0.0),
    )
    .map_err(cv_err("create Mat"))?;
    mat.data_bytes_mut()
        .map_err(cv_err("access Mat data"))?
        .copy_from_slice(image.data());
    Ok(mat)
}

/// Copies a continuous 8-bit `Mat` back into an [`Image`] tagged `order`.
pub fn mat_to_image(mat: &Mat, order: ChannelOrder) -> IoResult<Image> {
    let bytes = mat.data_bytes().map_err(cv_err("read Mat data"))?;
    Ok(Image::from_raw(bytes.to_vec(), mat.cols() as u32, mat.rows() as u32, order)?)
}

/// `Mat` ready for `imshow`: RGB(A) is swapped to OpenCV's BGR(A) order,
/// everything else (gray, HSV bytes) is shown as stored.
pub fn image_to_display_mat(image: &Image) -> IoResult<Mat> {
    let mat = image_to_mat(image)?;
    let code = match image.order() {
        ChannelOrder::Rgb => imgproc::COLOR_RGB2BGR,
        ChannelOrder::Rgba => imgproc::COLOR_RGBA2BGRA,
        _ => return Ok(mat),
    };
    let mut bgr = Mat::default();
    imgproc::cvt_color(&mat, &mut bgr, code, 0).map_err(cv_err("convert for display"))?;
    Ok(bgr)
}
