//! Box-blur parameters shared by every backend.
//!
//! Each output channel value is the truncated mean of the `(2r+1)^2` window
//! around the pixel, with coordinates clamped into the image (clamp-to-edge).
//! Sums are kept in `u32` so the truncating division is exact everywhere.

use pixbench_core::Image;

use crate::{ComputeError, ComputeResult};

/// Radius limit; the worst-case window sum (`255 * (2r+1)^2`) stays within `u32`.
pub const MAX_BLUR_RADIUS: u32 = 2047;

/// Number of samples in the window of `radius`.
pub fn window_area(radius: u32) -> u32 {
    let side = 2 * radius + 1;
    side * side
}

/// Checks a blur request before any backend work.
pub fn validate(input: &Image, radius: u32) -> ComputeResult<()> {
    if input.is_empty() {
        return Err(ComputeError::EmptyImage);
    }
    if radius > MAX_BLUR_RADIUS {
        return Err(ComputeError::InvalidParameter(format!(
            "blur radius {radius} exceeds maximum {MAX_BLUR_RADIUS}"
        )));
    }
    Ok(())
}

/// Clamps `coord + offset` into `0..len`.
#[inline]
pub fn clamp_coord(coord: u32, offset: i64, len: u32) -> u32 {
    (coord as i64 + offset).clamp(0, len as i64 - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixbench_core::ChannelOrder;

    #[test]
    fn test_max_radius_sum_fits_u32() {
        let worst = 255u64 * window_area(MAX_BLUR_RADIUS) as u64;
        assert!(worst <= u32::MAX as u64);
    }

    #[test]
    fn test_validate() {
        let img = Image::new(4, 4, ChannelOrder::Rgb);
        assert!(validate(&img, 0).is_ok());
        assert!(validate(&img, MAX_BLUR_RADIUS).is_ok());
        assert!(matches!(validate(&img, MAX_BLUR_RADIUS + 1), Err(ComputeError::InvalidParameter(_))));

        let empty = Image::new(4, 0, ChannelOrder::Rgb);
        assert!(matches!(validate(&empty, 1), Err(ComputeError::EmptyImage)));
    }

    #[test]
    fn test_clamp_coord() {
        assert_eq!(clamp_coord(0, -3, 10), 0);
        assert_eq!(clamp_coord(9, 2, 10), 9);
        assert_eq!(clamp_coord(5, -1, 10), 4);
    }
}
