//! RGB to HSV math shared by every backend.
//!
//! The 8-bit encoding matches OpenCV's `COLOR_RGB2HSV` for 8-bit images:
//! hue is stored halved (`0..180`), saturation and value are scaled to
//! `0..=255`. The device kernel in `shaders/pixel_ops.wgsl` mirrors
//! [`rgb_to_hsv`] and [`quantize`] line for line.

use pixbench_core::{ChannelOrder, Image};

use crate::{ComputeError, ComputeResult};

/// Unquantized HSV sample: hue in degrees `[0, 360)`, `s` and `v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Converts one 8-bit RGB sample.
///
/// When two channels tie for the maximum, red wins over green and green over
/// blue.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max_val = r.max(g).max(b);
    let min_val = r.min(g).min(b);
    let delta = max_val - min_val;

    let v = max_val;
    let s = if max_val == 0.0 { 0.0 } else { delta / max_val };

    let mut h = if delta == 0.0 {
        0.0
    } else if max_val == r {
        (60.0 * ((g - b) / delta)) % 360.0
    } else if max_val == g {
        60.0 * ((b - r) / delta) + 120.0
    } else {
        60.0 * ((r - g) / delta) + 240.0
    };
    if h < 0.0 {
        h += 360.0;
    }

    Hsv { h, s, v }
}

/// 8-bit storage encoding: `[floor(h/2), round(s*255), round(v*255)]`.
pub fn quantize(hsv: Hsv) -> [u8; 3] {
    [
        (hsv.h / 2.0).floor() as u8,
        (hsv.s * 255.0).round() as u8,
        (hsv.v * 255.0).round() as u8,
    ]
}

/// Converts and quantizes one pixel.
pub fn convert_pixel(r: u8, g: u8, b: u8) -> [u8; 3] {
    quantize(rgb_to_hsv(r, g, b))
}

/// Validates a color-conversion input and returns the output channel order.
pub fn output_order(input: &Image) -> ComputeResult<ChannelOrder> {
    if input.is_empty() {
        return Err(ComputeError::EmptyImage);
    }
    input
        .order()
        .to_hsv()
        .ok_or(ComputeError::UnsupportedChannels(input.channels()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gray_has_no_hue_or_saturation() {
        for level in [0u8, 1, 77, 128, 254, 255] {
            let hsv = rgb_to_hsv(level, level, level);
            assert_eq!(hsv.h, 0.0);
            assert_eq!(hsv.s, 0.0);
            assert_abs_diff_eq!(hsv.v, level as f32 / 255.0);
        }
    }

    #[test]
    fn test_primaries_and_white() {
        let pixels = [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255)];
        let hues = [0.0, 120.0, 240.0, 0.0];
        let sats = [1.0, 1.0, 1.0, 0.0];

        for (((r, g, b), h), s) in pixels.into_iter().zip(hues).zip(sats) {
            let hsv = rgb_to_hsv(r, g, b);
            assert_abs_diff_eq!(hsv.h, h, epsilon = 1e-4);
            assert_abs_diff_eq!(hsv.s, s, epsilon = 1e-6);
            assert_abs_diff_eq!(hsv.v, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tie_prefers_red_then_green() {
        // Yellow: red and green tie, red branch gives 60 degrees.
        let yellow = rgb_to_hsv(255, 255, 0);
        assert_abs_diff_eq!(yellow.h, 60.0, epsilon = 1e-4);
        assert_eq!(convert_pixel(255, 255, 0), [30, 255, 255]);

        // Cyan: green and blue tie, green branch gives 180 degrees.
        let cyan = rgb_to_hsv(0, 255, 255);
        assert_abs_diff_eq!(cyan.h, 180.0, epsilon = 1e-4);

        // Magenta: red and blue tie, red branch wraps to 300 degrees.
        let magenta = rgb_to_hsv(255, 0, 255);
        assert_abs_diff_eq!(magenta.h, 300.0, epsilon = 1e-4);
    }

    #[test]
    fn test_quantize_halves_hue_and_rounds() {
        assert_eq!(quantize(Hsv { h: 359.9, s: 1.0, v: 1.0 }), [179, 255, 255]);
        assert_eq!(quantize(Hsv { h: 3.0, s: 0.5, v: 0.0 }), [1, 128, 0]);
        assert_eq!(convert_pixel(0, 0, 255), [120, 255, 255]);
        assert_eq!(convert_pixel(128, 128, 128), [0, 0, 128]);
    }

    #[test]
    fn test_output_order() {
        let rgb = Image::new(2, 2, ChannelOrder::Rgb);
        assert_eq!(output_order(&rgb).unwrap(), ChannelOrder::Hsv);

        let rgba = Image::new(2, 2, ChannelOrder::Rgba);
        assert_eq!(output_order(&rgba).unwrap(), ChannelOrder::Hsva);

        let gray = Image::new(2, 2, ChannelOrder::Gray);
        assert!(matches!(output_order(&gray), Err(ComputeError::UnsupportedChannels(1))));

        let empty = Image::new(0, 3, ChannelOrder::Rgb);
        assert!(matches!(output_order(&empty), Err(ComputeError::EmptyImage)));
    }
}
