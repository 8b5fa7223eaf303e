//! Backend tests for pixbench-compute.

use pixbench_compute::{
    BackendKind, BackendOptions, ComputeError, PixelBackend, ScalarBackend, create_backend, describe_backends,
};
use pixbench_core::{ChannelOrder, Image};

fn rgb(width: u32, height: u32, pixels: &[[u8; 3]]) -> Image {
    Image::from_raw(pixels.concat(), width, height, ChannelOrder::Rgb).unwrap()
}

/// Deterministic non-uniform test image.
fn noise(width: u32, height: u32, channels: u32) -> Image {
    let mut state = 0x2545_f491u32;
    let data = (0..width * height * channels)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    let order = ChannelOrder::for_channels(channels).unwrap();
    Image::from_raw(data, width, height, order).unwrap()
}

fn max_abs_diff(a: &Image, b: &Image) -> u8 {
    a.data().iter().zip(b.data()).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0)
}

#[test]
fn test_cpu_backend_available() {
    assert!(BackendKind::Scalar.is_available());
}

#[test]
fn test_describe_backends() {
    let desc = describe_backends();
    println!("{}", desc);
    assert!(desc.contains("CPU"));
    assert!(desc.contains("GPU"));
    assert!(desc.contains("OpenCV"));
}

#[test]
fn test_hsv_primaries() {
    let img = rgb(2, 2, &[[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]]);
    let hsv = ScalarBackend::new().convert_color_space(&img).unwrap();

    assert_eq!(hsv.order(), ChannelOrder::Hsv);
    assert_eq!(hsv.dimensions(), img.dimensions());
    assert_eq!(hsv.pixel(0, 0), &[0, 255, 255]);
    assert_eq!(hsv.pixel(1, 0), &[60, 255, 255]);
    assert_eq!(hsv.pixel(0, 1), &[120, 255, 255]);
    assert_eq!(hsv.pixel(1, 1), &[0, 0, 255]);
}

#[test]
fn test_hsv_does_not_touch_input() {
    let img = noise(7, 5, 3);
    let copy = img.clone();
    let _ = ScalarBackend::new().convert_color_space(&img).unwrap();
    assert_eq!(img, copy);
}

#[test]
fn test_blur_radius_zero_is_identity() {
    let img = noise(9, 4, 3);
    let out = ScalarBackend::new().apply_box_blur(&img, 0).unwrap();
    assert_eq!(out, img);
}

/// Radius-1 blur of a 3x3 gray ramp, checked against hand-computed means.
fn check_corner_clamp(backend: &mut dyn PixelBackend) {
    // 3x3 gray:
    //   10  20  30
    //   40  50  60
    //   70  80  90
    let img = Image::from_raw(vec![10, 20, 30, 40, 50, 60, 70, 80, 90], 3, 3, ChannelOrder::Gray).unwrap();
    let out = backend.apply_box_blur(&img, 1).unwrap();

    // Top-left window with clamping:
    //   10 10 20 / 10 10 20 / 40 40 50 -> 210 / 9 = 23
    assert_eq!(out.pixel(0, 0), &[23]);
    // Centre sees the whole image: 450 / 9 = 50
    assert_eq!(out.pixel(1, 1), &[50]);
    // Bottom-right: 50 60 60 / 80 90 90 / 80 90 90 -> 690 / 9 = 76
    assert_eq!(out.pixel(2, 2), &[76]);
}

#[test]
fn test_blur_corner_clamps_to_edge() {
    check_corner_clamp(&mut ScalarBackend::new());
}

#[test]
fn test_blur_twice_differs_from_once() {
    let img = noise(16, 12, 3);
    let mut backend = ScalarBackend::new();
    let once = backend.apply_box_blur(&img, 2).unwrap();
    let twice = backend.apply_box_blur(&once, 2).unwrap();
    assert_ne!(once, twice);
    assert_eq!(twice.order(), ChannelOrder::Rgb);
}

#[test]
fn test_empty_image_rejected() {
    let empty = Image::new(0, 0, ChannelOrder::Rgb);
    let mut backend = ScalarBackend::new();
    assert!(matches!(backend.convert_color_space(&empty), Err(ComputeError::EmptyImage)));
    assert!(matches!(backend.apply_box_blur(&empty, 3), Err(ComputeError::EmptyImage)));
}

#[test]
fn test_single_channel_hsv_rejected() {
    let gray = noise(4, 4, 1);
    let result = ScalarBackend::new().convert_color_space(&gray);
    assert!(matches!(result, Err(ComputeError::UnsupportedChannels(1))));
}

#[test]
fn test_blur_keeps_gray_alpha_layout() {
    let img = noise(5, 5, 2);
    let out = ScalarBackend::new().apply_box_blur(&img, 1).unwrap();
    assert_eq!(out.order(), ChannelOrder::GrayAlpha);
}

#[test]
fn test_missing_kernel_is_setup_error() {
    let options = BackendOptions { kernel_path: Some("/nonexistent/pixel_ops.wgsl".into()) };
    match create_backend(BackendKind::Device, &options) {
        Err(err) => {
            assert!(err.is_setup() || matches!(err, ComputeError::BackendNotAvailable(_)), "got {err:?}");
            if cfg!(feature = "wgpu") {
                assert!(matches!(err, ComputeError::KernelSource { .. }), "got {err:?}");
            }
        }
        Ok(_) => panic!("missing kernel file must fail"),
    }
}

#[cfg(feature = "wgpu")]
mod device {
    use super::*;
    use pixbench_compute::DeviceBackend;

    fn device_or_skip() -> Option<DeviceBackend> {
        if !DeviceBackend::is_available() {
            println!("Skipping: no GPU adapter");
            return None;
        }
        match DeviceBackend::new(&BackendOptions::default()) {
            Ok(backend) => Some(backend),
            Err(e) => {
                println!("Skipping: {e}");
                None
            }
        }
    }

    #[test]
    fn test_device_hsv_matches_scalar() {
        let Some(mut gpu) = device_or_skip() else { return };
        println!("GPU adapter: {}", gpu.adapter_name());

        for channels in [3, 4] {
            let img = noise(37, 23, channels);
            let expected = ScalarBackend::new().convert_color_space(&img).unwrap();
            let actual = gpu.convert_color_space(&img).unwrap();
            assert_eq!(actual.order(), expected.order());
            assert!(max_abs_diff(&actual, &expected) <= 1, "channels {channels}");
        }
    }

    #[test]
    fn test_device_blur_matches_scalar() {
        let Some(mut gpu) = device_or_skip() else { return };

        // Odd byte count exercises the padded tail word.
        let img = noise(13, 7, 3);
        for radius in [0, 1, 4] {
            let expected = ScalarBackend::new().apply_box_blur(&img, radius).unwrap();
            let actual = gpu.apply_box_blur(&img, radius).unwrap();
            // Integer sums and truncating division on both sides.
            assert_eq!(actual, expected, "radius {radius}");
        }
    }

    #[test]
    fn test_device_blur_corner_clamps_to_edge() {
        let Some(mut gpu) = device_or_skip() else { return };
        check_corner_clamp(&mut gpu);
    }

    #[test]
    fn test_device_rejects_bad_input() {
        let Some(mut gpu) = device_or_skip() else { return };
        let img = noise(4, 4, 3);
        assert!(matches!(
            gpu.apply_box_blur(&img, pixbench_compute::MAX_BLUR_RADIUS + 1),
            Err(ComputeError::InvalidParameter(_))
        ));
        assert!(matches!(gpu.convert_color_space(&noise(4, 4, 1)), Err(ComputeError::UnsupportedChannels(1))));
    }
}

#[cfg(feature = "opencv")]
mod library {
    use super::*;
    use pixbench_compute::LibraryBackend;

    #[test]
    fn test_scalar_hsv_matches_opencv() {
        // Primaries, secondaries and grays: hue lands on whole degrees, where
        // flooring and OpenCV's rounding agree.
        let img = rgb(
            4,
            3,
            &[
                [255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255],
                [255, 255, 0], [0, 255, 255], [255, 0, 255], [0, 0, 0],
                [128, 128, 128], [64, 64, 64], [200, 0, 0], [0, 0, 100],
            ],
        );
        let expected = LibraryBackend::new().convert_color_space(&img).unwrap();
        let actual = ScalarBackend::new().convert_color_space(&img).unwrap();
        assert_eq!(actual.data(), expected.data());
    }

    #[test]
    fn test_scalar_blur_close_to_opencv() {
        let img = noise(20, 15, 3);
        let expected = LibraryBackend::new().apply_box_blur(&img, 2).unwrap();
        let actual = ScalarBackend::new().apply_box_blur(&img, 2).unwrap();
        // filter2D rounds, the reference truncates.
        assert!(max_abs_diff(&actual, &expected) <= 1);
    }
}
