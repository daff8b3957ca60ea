//! Luminance conversion through a 4x5 colour matrix.

use super::decoded::{DecodedImage, allocate_pixels};
use super::error::ConvertError;
use image::RgbaImage;

/// Row-major 4x5 colour matrix over `[R, G, B, A, 1]`, in the layout of
/// Android's `ColorMatrix`. Row `i` produces output channel `i`; the fifth
/// column is an offset in 0..=255 units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

/// NTSC luma weights written to R, G and B; alpha passes through.
pub const GRAYSCALE_MATRIX: ColorMatrix = ColorMatrix([
    0.3, 0.59, 0.11, 0.0, 0.0, //
    0.3, 0.59, 0.11, 0.0, 0.0, //
    0.3, 0.59, 0.11, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
]);

impl ColorMatrix {
    pub fn apply(&self, pixel: [u8; 4]) -> [u8; 4] {
        let input = pixel.map(f32::from);
        let mut out = [0u8; 4];
        for (channel, row) in out.iter_mut().zip(self.0.chunks_exact(5)) {
            let value = row[0] * input[0]
                + row[1] * input[1]
                + row[2] * input[2]
                + row[3] * input[3]
                + row[4];
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/// Convert to grayscale, consuming the source.
pub fn to_grayscale(image: DecodedImage) -> Result<DecodedImage, ConvertError> {
    apply_matrix(image, &GRAYSCALE_MATRIX)
}

/// Run every pixel through `matrix` into a fresh buffer of the same size.
pub fn apply_matrix(image: DecodedImage, matrix: &ColorMatrix) -> Result<DecodedImage, ConvertError> {
    let (width, height) = (image.width(), image.height());
    let mut buf = allocate_pixels(width, height)?;
    for pixel in image.pixels().pixels() {
        buf.extend_from_slice(&matrix.apply(pixel.0));
    }

    let format = image.source_format();
    drop(image);

    let pixels = RgbaImage::from_raw(width, height, buf)
        .ok_or(ConvertError::InvalidDimensions { width, height })?;
    DecodedImage::new(pixels, format)
}
