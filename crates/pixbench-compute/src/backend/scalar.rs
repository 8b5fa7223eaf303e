//! Sequential reference backend.
//!
//! Plain nested loops over rows, columns and channels; no threads, no SIMD.
//! This is the correctness baseline the other backends are compared to and
//! the "CPU only" timing.

use pixbench_core::Image;
use tracing::trace;

use super::{BackendKind, PixelBackend};
use crate::{ComputeResult, blur, hsv};

/// Sequential CPU backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarBackend;

impl ScalarBackend {
    /// Create new scalar backend.
    pub fn new() -> Self {
        Self
    }
}

impl PixelBackend for ScalarBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scalar
    }

    fn convert_color_space(&mut self, input: &Image) -> ComputeResult<Image> {
        let order = hsv::output_order(input)?;
        trace!(width = input.width(), height = input.height(), "scalar::convert_color_space");

        let mut output = input.zeroed_like(order)?;
        for y in 0..input.height() {
            for x in 0..input.width() {
                let src = input.pixel(x, y);
                let dst = output.pixel_mut(x, y);
                dst[..3].copy_from_slice(&hsv::convert_pixel(src[0], src[1], src[2]));
                if src.len() > 3 {
                    dst[3] = src[3];
                }
            }
        }
        Ok(output)
    }

    fn apply_box_blur(&mut self, input: &Image, radius: u32) -> ComputeResult<Image> {
        blur::validate(input, radius)?;
        trace!(width = input.width(), height = input.height(), radius, "scalar::apply_box_blur");

        let (width, height, channels) = input.dimensions();
        let area = blur::window_area(radius);
        let r = radius as i64;

        let mut output = input.zeroed_like(input.order())?;
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels as usize {
                    let mut sum = 0u32;
                    for dy in -r..=r {
                        let sy = blur::clamp_coord(y, dy, height);
                        for dx in -r..=r {
                            let sx = blur::clamp_coord(x, dx, width);
                            sum += input.pixel(sx, sy)[c] as u32;
                        }
                    }
                    output.pixel_mut(x, y)[c] = (sum / area) as u8;
                }
            }
        }
        Ok(output)
    }
}
