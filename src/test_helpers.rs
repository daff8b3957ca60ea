//! Shared test utilities: synthetic images and their encoded bytes.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let image = gradient_image(40, 30);
//! let png = png_bytes(40, 30);
//! write_png(&tmp.path().join("a.png"), 40, 30);
//! ```

use crate::imaging::DecodedImage;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Opaque image whose red channel ramps left to right and green top to
/// bottom.
pub fn gradient_image(width: u32, height: u32) -> DecodedImage {
    DecodedImage::new(gradient_pixels(width, height), None).unwrap()
}

fn gradient_pixels(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ])
    })
}

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(gradient_pixels(width, height));
    let img = match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Jpeg)
}

/// Write a gradient PNG to `path`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}
