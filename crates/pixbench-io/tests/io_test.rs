//! Codec tests for pixbench-io.

use pixbench_core::{ChannelOrder, Image};
use pixbench_io::{IoError, read, read_unchanged, write};

fn gradient(width: u32, height: u32, order: ChannelOrder) -> Image {
    let c = order.channels();
    let data = (0..width * height * c).map(|i| (i * 7 % 256) as u8).collect();
    Image::from_raw(data, width, height, order).unwrap()
}

#[test]
fn test_png_keeps_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.png");
    let img = gradient(5, 4, ChannelOrder::Rgb);

    write(&path, &img).unwrap();
    let back = read(&path).unwrap();

    assert_eq!(back.dimensions(), (5, 4, 3));
    assert_eq!(back.data(), img.data());
}

#[test]
fn test_read_drops_alpha_read_unchanged_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgba.png");
    let img = gradient(3, 3, ChannelOrder::Rgba);
    write(&path, &img).unwrap();

    let color = read(&path).unwrap();
    assert_eq!(color.order(), ChannelOrder::Rgb);
    assert_eq!(color.pixel(1, 1), &img.pixel(1, 1)[..3]);

    let unchanged = read_unchanged(&path).unwrap();
    assert_eq!(unchanged.order(), ChannelOrder::Rgba);
    assert_eq!(unchanged.data(), img.data());
}

#[test]
fn test_jpeg_with_alpha_is_written_as_rgb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgba.jpg");
    write(&path, &gradient(8, 8, ChannelOrder::Rgba)).unwrap();

    let back = read_unchanged(&path).unwrap();
    assert_eq!(back.channels(), 3);
    assert_eq!((back.width(), back.height()), (8, 8));
}

#[test]
fn test_missing_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read(dir.path().join("nope.png")).unwrap_err();
    assert!(matches!(err, IoError::Decode { .. }), "got {err:?}");
}

#[test]
fn test_garbage_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.png");
    std::fs::write(&path, b"definitely not an image").unwrap();
    assert!(matches!(read(&path), Err(IoError::Decode { .. })));
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = write(dir.path().join("out.exr"), &gradient(2, 2, ChannelOrder::Rgb)).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(ref ext) if ext == "exr"));
}
