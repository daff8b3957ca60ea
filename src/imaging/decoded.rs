//! The in-memory pixel buffer passed between stages.

use super::backend::Dimensions;
use super::error::ConvertError;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// A decoded RGBA8 image.
///
/// Width and height are always non-zero. Transforms that consume their
/// input take this by value; dropping it releases the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
    source_format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage, source_format: Option<ImageFormat>) -> Result<Self, ConvertError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels,
            source_format,
        })
    }

    pub fn from_dynamic(
        image: DynamicImage,
        source_format: Option<ImageFormat>,
    ) -> Result<Self, ConvertError> {
        Self::new(image.into_rgba8(), source_format)
    }

    /// Unwrap a loader result, failing with [`ConvertError::NullImage`]
    /// when no image was produced.
    pub fn require(image: Option<Self>) -> Result<Self, ConvertError> {
        image.ok_or(ConvertError::NullImage)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Format the pixels were decoded from, if they came from a codec.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Reserve an RGBA8 buffer for `width x height` pixels without aborting
/// on allocation failure.
pub(crate) fn allocate_pixels(width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let len = pixel_buffer_len(width, height)?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    Ok(buf)
}

/// Byte length of an RGBA8 buffer, failing instead of overflowing.
pub(crate) fn pixel_buffer_len(width: u32, height: u32) -> Result<usize, ConvertError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| {
            ConvertError::OutOfMemory(format!("{width}x{height} RGBA buffer overflows usize"))
        })
}
