//! WGSL kernel sources for the device backend.

#![cfg_attr(not(feature = "wgpu"), allow(dead_code))]

/// Bundled kernel with the `rgb_to_hsv` and `box_blur` entry points.
///
/// Both read `Params { width, height, channels, radius }` at binding 2 and
/// take their work-group size from the `WG_X` / `WG_Y` override constants.
pub const PIXEL_OPS: &str = include_str!("pixel_ops.wgsl");

/// Entry point of the color conversion.
pub const HSV_ENTRY: &str = "rgb_to_hsv";

/// Entry point of the box blur.
pub const BLUR_ENTRY: &str = "box_blur";
