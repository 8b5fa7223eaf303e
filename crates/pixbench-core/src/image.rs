//! 8-bit image buffer shared by every backend.
//!
//! # Memory Layout
//!
//! Pixels are stored in **row-major** order, top-to-bottom, with channels
//! interleaved:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! Every channel is one byte ([`BYTE_DEPTH`]), so the buffer length is always
//! `width * height * channels`. The constructors enforce this and nothing
//! hands out a way to resize the buffer afterwards.
//!
//! # Usage
//!
//! ```rust
//! use pixbench_core::{ChannelOrder, Image};
//!
//! let img = Image::from_raw(vec![255, 0, 0, 0, 255, 0], 2, 1, ChannelOrder::Rgb).unwrap();
//! assert_eq!(img.pixel(1, 0), &[0, 255, 0]);
//! ```

use crate::{Error, Result};

/// Bytes per channel value. All pixbench images are 8-bit.
pub const BYTE_DEPTH: u32 = 1;

/// Meaning of the interleaved channels of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Single luminance channel.
    Gray,
    /// Luminance + alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// 8-bit HSV: hue in `0..180`, saturation and value in `0..=255`.
    Hsv,
    /// 8-bit HSV with alpha carried through from the source.
    Hsva,
}

impl ChannelOrder {
    /// Number of interleaved channels for this order.
    pub const fn channels(self) -> u32 {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb | Self::Hsv => 3,
            Self::Rgba | Self::Hsva => 4,
        }
    }

    /// Decoded order for a plain channel count (gray / gray+alpha / rgb / rgba).
    pub fn for_channels(channels: u32) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            2 => Ok(Self::GrayAlpha),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(Error::UnsupportedChannels(n)),
        }
    }

    /// Order produced by an RGB->HSV conversion of an image in this order.
    ///
    /// Only three- and four-channel layouts convert; alpha survives as `Hsva`.
    pub fn to_hsv(self) -> Option<Self> {
        match self.channels() {
            3 => Some(Self::Hsv),
            4 => Some(Self::Hsva),
            _ => None,
        }
    }

    /// Whether the last channel is alpha.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba | Self::Hsva)
    }
}

/// Owned 8-bit pixel buffer.
///
/// Transforms never mutate their input: they allocate a new `Image` for the
/// result, so a reader of an image can rely on it never changing under it.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: ChannelOrder,
}

impl Image {
    /// Creates a zero-filled image.
    pub fn new(width: u32, height: u32, order: ChannelOrder) -> Self {
        let len = buffer_len(width, height, order.channels());
        Self { data: vec![0; len], width, height, order }
    }

    /// Wraps an existing buffer, checking its length against the dimensions.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        let expected = buffer_len(width, height, order.channels());
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch { expected, actual: data.len() });
        }
        Ok(Self { data, width, height, order })
    }

    /// Zero-filled image with the same shape as `self`, in `order`.
    ///
    /// `order` must have the same channel count as `self`.
    pub fn zeroed_like(&self, order: ChannelOrder) -> Result<Self> {
        if order.channels() != self.channels() {
            return Err(Error::ChannelMismatch {
                order,
                expected: order.channels(),
                got: self.channels(),
            });
        }
        Ok(Self::new(self.width, self.height, order))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u32 {
        self.order.channels()
    }

    /// Channel order.
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// (width, height, channels).
    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels())
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels() as usize
    }

    /// Number of pixels, `width * height`.
    pub fn pixel_count(&self) -> usize {
        pixel_count(self.width, self.height)
    }

    /// Total size of the pixel buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw interleaved bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes. The length cannot change through this slice.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Channel values of the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds. Use
    /// [`get_pixel`](Self::get_pixel) for a checked variant.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels() as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }

    /// Checked [`pixel`](Self::pixel).
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<&[u8]> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(self.pixel(x, y))
    }

    /// Mutable channel values of the pixel at (x, y).
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let c = self.channels() as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &mut self.data[start..start + c]
    }

    /// One row of interleaved bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Re-tags the channel order without touching pixel data.
    pub fn with_order(mut self, order: ChannelOrder) -> Result<Self> {
        if order.channels() != self.channels() {
            return Err(Error::ChannelMismatch {
                order,
                expected: order.channels(),
                got: self.channels(),
            });
        }
        self.order = order;
        Ok(self)
    }

    /// Fails unless `other` has the same width, height and channel count.
    pub fn ensure_same_shape(&self, other: &Image) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                a_width: self.width,
                a_height: self.height,
                a_channels: self.channels(),
                b_width: other.width,
                b_height: other.height,
                b_channels: other.channels(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("order", &self.order)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn buffer_len(width: u32, height: u32, channels: u32) -> usize {
    pixel_count(width, height) * channels as usize * BYTE_DEPTH as usize
}
