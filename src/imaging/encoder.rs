//! Compression and persistence.
//!
//! [`encode`] is the shared compression step. [`save_to_file`] and
//! [`to_base64`] put its bytes somewhere: a new file (never overwritten)
//! or a standard padded base64 string.

use super::decoded::DecodedImage;
use super::error::{ConvertError, from_image_error};
use super::params::{CompressFormat, Quality};
use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Compress `image` into `format`. `quality` only affects JPEG, which has no
/// alpha channel: translucent pixels are composited over black first.
pub fn encode(
    image: &DecodedImage,
    format: CompressFormat,
    quality: Quality,
) -> Result<Vec<u8>, ConvertError> {
    let mut bytes = Vec::new();
    let (width, height) = (image.width(), image.height());

    match format {
        CompressFormat::Jpeg => {
            let rgb = flatten_on_black(image.pixels());
            // JpegEncoder takes a u8 quality in 1..=100
            let quality = quality.value().clamp(1, 100) as u8;
            JpegEncoder::new_with_quality(&mut bytes, quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(from_image_error)?;
        }
        CompressFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(
                    image.pixels().as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(from_image_error)?;
        }
    }

    Ok(bytes)
}

/// Composite RGBA over an opaque black background.
fn flatten_on_black(pixels: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let [r, g, b, a] = pixels.get_pixel(x, y).0;
        let over = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// Write `image` to a new file at `path`, consuming it.
///
/// Fails with [`ConvertError::AlreadyExists`] if anything is already at
/// `path`. The file is created before compression starts; if compression
/// fails the empty file is removed again.
pub fn save_to_file(
    image: DecodedImage,
    path: &Path,
    format: CompressFormat,
    quality: Quality,
) -> Result<u64, ConvertError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ConvertError::AlreadyExists(path.to_path_buf()),
            _ => ConvertError::Io(e),
        })?;

    let bytes = match encode(&image, format, quality) {
        Ok(bytes) => bytes,
        Err(err) => {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path) {
                log::warn!("could not remove {}: {cleanup}", path.display());
            }
            return Err(err);
        }
    };
    drop(image);

    file.write_all(&bytes)?;
    file.flush()?;
    log::info!(
        "wrote {} bytes of {} to {}",
        bytes.len(),
        format.mime_type(),
        path.display()
    );
    Ok(bytes.len() as u64)
}

/// Compress at [`Quality::MAX`] and return standard padded base64.
pub fn to_base64(image: &DecodedImage, format: CompressFormat) -> Result<String, ConvertError> {
    let bytes = encode(image, format, Quality::MAX)?;
    log::debug!("base64-encoding {} bytes of {}", bytes.len(), format.mime_type());
    Ok(general_purpose::STANDARD.encode(bytes))
}
