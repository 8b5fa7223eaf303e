//! Image decode/encode and display for pixbench.
//!
//! The compute crate treats this as an opaque collaborator: it only needs
//! [`read`], [`write`] and a [`Viewer`] to show results.
//!
//! # Example
//!
//! ```ignore
//! use pixbench_io::{read, write};
//!
//! let img = read("images/animal/1.kitten_small.jpg")?;
//! write("out/copy.png", &img)?;
//! ```

use std::path::Path;

use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use pixbench_core::{ChannelOrder, Image};
use tracing::{debug, trace};

mod error;
pub mod viewer;

#[cfg(feature = "opencv")]
pub mod cv;

pub use error::{IoError, IoResult};
pub use viewer::{NullViewer, Viewer};

#[cfg(feature = "opencv")]
pub use viewer::HighGuiViewer;

/// Encoded formats pixbench writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PNG (lossless, keeps alpha).
    Png,
    /// JPEG (lossy, alpha dropped on write).
    Jpeg,
}

impl Format {
    /// Detects format from the file extension.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        Self::from_name(&ext)
    }

    /// Parses a format name such as `png`, `jpg` or `jpeg`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Reads an image and normalizes it to 8-bit RGB.
///
/// Grayscale is expanded and alpha is dropped, like a color `imread`.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    trace!(path = %path.display(), "io::read");
    let rgb = decode(path)?.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Image::from_raw(rgb.into_raw(), width, height, ChannelOrder::Rgb)?)
}

/// Reads an image keeping its channel layout (gray, gray+alpha, RGB, RGBA).
///
/// Deeper-than-8-bit sources are reduced to 8 bits per channel.
pub fn read_unchanged<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    trace!(path = %path.display(), "io::read_unchanged");
    let img = decode(path)?;
    let (width, height) = (img.width(), img.height());

    let (data, order) = match img {
        DynamicImage::ImageLuma8(buf) => (buf.into_raw(), ChannelOrder::Gray),
        DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), ChannelOrder::GrayAlpha),
        DynamicImage::ImageRgb8(buf) => (buf.into_raw(), ChannelOrder::Rgb),
        DynamicImage::ImageRgba8(buf) => (buf.into_raw(), ChannelOrder::Rgba),
        other => {
            let color = other.color();
            match (color.has_color(), color.has_alpha()) {
                (false, false) => (other.into_luma8().into_raw(), ChannelOrder::Gray),
                (false, true) => (other.into_luma_alpha8().into_raw(), ChannelOrder::GrayAlpha),
                (true, false) => (other.into_rgb8().into_raw(), ChannelOrder::Rgb),
                (true, true) => (other.into_rgba8().into_raw(), ChannelOrder::Rgba),
            }
        }
    };

    Ok(Image::from_raw(data, width, height, order)?)
}

/// Writes an image; the format comes from the file extension.
///
/// Channel bytes are written as they are, so an HSV image is stored with its
/// H, S, V bytes in the R, G, B slots.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path).ok_or_else(|| {
        IoError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;
    trace!(path = %path.display(), ?format, "io::write");

    let (width, height, channels) = image.dimensions();
    let stripped;
    let (bytes, channels) = if format == Format::Jpeg && image.order().has_alpha() {
        debug!(path = %path.display(), "dropping alpha for JPEG");
        stripped = strip_alpha(image);
        (stripped.as_slice(), channels - 1)
    } else {
        (image.data(), channels)
    };

    let color = match channels {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => return Err(IoError::UnsupportedLayout(format!("{n} channels"))),
    };

    image::save_buffer_with_format(path, bytes, width, height, color, format.image_format())
        .map_err(|source| IoError::Encode { path: path.to_path_buf(), source })
}

fn decode(path: &Path) -> IoResult<DynamicImage> {
    let to_decode_err = |source: image::ImageError| IoError::Decode { path: path.to_path_buf(), source };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| to_decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_decode_err)
}

fn strip_alpha(image: &Image) -> Vec<u8> {
    let c = image.channels() as usize;
    image
        .data()
        .chunks_exact(c)
        .flat_map(|px| px[..c - 1].iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("a/b/1.kitten.JPG"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("x.jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("x.png"), Some(Format::Png));
        assert_eq!(Format::from_extension("x.exr"), None);
        assert_eq!(Format::from_extension("noext"), None);
    }

    #[test]
    fn test_strip_alpha() {
        let img = Image::from_raw(vec![1, 2, 3, 4, 5, 6, 7, 8], 2, 1, ChannelOrder::Rgba).unwrap();
        assert_eq!(strip_alpha(&img), vec![1, 2, 3, 5, 6, 7]);
    }
}
