//! Resampling to a target size.
//!
//! Two algorithms live here and they are not interchangeable:
//!
//! | Operation | Anchor | Edges |
//! |---|---|---|
//! | [`resize`] / [`resize_keep_source`] | top-left, via `imageops::resize` (`Triangle`) | clamped |
//! | [`scale_with_matrix`] | centre, via a `kurbo::Affine` scale about the midpoint | anti-aliased against transparency |
//!
//! For even source dimensions both fill the whole destination. For an odd
//! source width or height the centred variant places the image half a
//! source pixel off the grid (the offset uses integer halving), so its
//! outermost destination column or row comes out partially transparent.

use super::decoded::{DecodedImage, allocate_pixels};
use super::error::ConvertError;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::{Affine, Point};

/// Bilinear resample to exactly `width x height`, consuming the source.
///
/// Aspect ratio is not preserved; callers pick proportional dimensions
/// themselves when they want that.
pub fn resize(image: DecodedImage, width: u32, height: u32) -> Result<DecodedImage, ConvertError> {
    let resized = resize_keep_source(&image, width, height)?;
    drop(image);
    Ok(resized)
}

/// Same as [`resize`] but leaves the source with the caller.
///
/// `imageops::resize` allocates its output and intermediate rows itself and
/// cannot report failure. The up-front reservation is only a size sanity
/// check: a target whose RGBA buffer cannot be reserved at all fails with
/// [`ConvertError::OutOfMemory`] before resampling starts.
pub fn resize_keep_source(
    image: &DecodedImage,
    width: u32,
    height: u32,
) -> Result<DecodedImage, ConvertError> {
    check_target(width, height)?;
    drop(allocate_pixels(width, height)?);

    let pixels = imageops::resize(image.pixels(), width, height, FilterType::Triangle);
    log::debug!(
        "resized {}x{} -> {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    DecodedImage::new(pixels, image.source_format())
}

/// Centred scale: ratios `width / src_w` and `height / src_h` about the
/// destination midpoint, sampled bilinearly in premultiplied alpha.
pub fn scale_with_matrix(
    image: &DecodedImage,
    width: u32,
    height: u32,
) -> Result<DecodedImage, ConvertError> {
    check_target(width, height)?;
    let (src_w, src_h) = (image.width(), image.height());

    let mid = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let offset = (mid.0 - f64::from(src_w / 2), mid.1 - f64::from(src_h / 2));
    let matrix = Affine::translate(mid)
        * Affine::scale_non_uniform(
            f64::from(width) / f64::from(src_w),
            f64::from(height) / f64::from(src_h),
        )
        * Affine::translate((-mid.0, -mid.1))
        * Affine::translate(offset);

    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(ConvertError::InvalidDimensions { width, height });
    }
    let inverse = matrix.inverse();
    let top_left = matrix * Point::ORIGIN;
    let bottom_right = matrix * Point::new(f64::from(src_w), f64::from(src_h));

    let mut buf = allocate_pixels(width, height)?;
    for y in 0..height {
        let cover_y = overlap(f64::from(y), top_left.y, bottom_right.y);
        for x in 0..width {
            let coverage = overlap(f64::from(x), top_left.x, bottom_right.x) * cover_y;
            if coverage <= 0.0 {
                buf.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let src = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let sample = sample_bilinear(image.pixels(), src.x - 0.5, src.y - 0.5);
            buf.extend_from_slice(&unpremultiply(sample.map(|c| c * coverage)));
        }
    }

    let pixels = RgbaImage::from_raw(width, height, buf)
        .ok_or(ConvertError::InvalidDimensions { width, height })?;
    log::debug!("matrix-scaled {src_w}x{src_h} -> {width}x{height}");
    DecodedImage::new(pixels, image.source_format())
}

fn check_target(width: u32, height: u32) -> Result<(), ConvertError> {
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Length of `[start, start + 1]` that lies inside `[lo, hi]`.
fn overlap(start: f64, lo: f64, hi: f64) -> f64 {
    ((start + 1.0).min(hi) - start.max(lo)).clamp(0.0, 1.0)
}

/// Premultiplied RGBA at a fractional position, clamping to the edge pixels.
fn sample_bilinear(pixels: &RgbaImage, u: f64, v: f64) -> [f64; 4] {
    let max_x = f64::from(pixels.width() - 1);
    let max_y = f64::from(pixels.height() - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);

    let at = |x: f64, y: f64| premultiply(pixels.get_pixel(x as u32, y as u32).0);
    let (p00, p10, p01, p11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));

    let mut out = [0.0; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let top = p00[i] + (p10[i] - p00[i]) * fx;
        let bottom = p01[i] + (p11[i] - p01[i]) * fx;
        *slot = top + (bottom - top) * fy;
    }
    out
}

fn premultiply([r, g, b, a]: [u8; 4]) -> [f64; 4] {
    let alpha = f64::from(a);
    [
        f64::from(r) * alpha / 255.0,
        f64::from(g) * alpha / 255.0,
        f64::from(b) * alpha / 255.0,
        alpha,
    ]
}

fn unpremultiply([r, g, b, a]: [f64; 4]) -> [u8; 4] {
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |c: f64| (c * 255.0 / a).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b), a.round().clamp(0.0, 255.0) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::test_helpers::gradient_image;
    use image::Rgba;
    use proptest::prelude::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
        DecodedImage::new(RgbaImage::from_pixel(width, height, Rgba(color)), None).unwrap()
    }

    #[test]
    fn resize_produces_exact_dimensions() {
        let resized = resize(gradient_image(64, 48), 10, 30).unwrap();
        assert_eq!(resized.dimensions(), Dimensions { width: 10, height: 30 });
    }

    #[test]
    fn resize_keep_source_leaves_input_intact() {
        let source = gradient_image(20, 20);
        let before = source.clone();
        let upscaled = resize_keep_source(&source, 45, 7).unwrap();
        assert_eq!(upscaled.dimensions(), Dimensions { width: 45, height: 7 });
        assert_eq!(source, before);
    }

    #[test]
    fn resize_keeps_solid_colour() {
        let resized = resize(solid(9, 9, [200, 10, 60, 255]), 4, 13).unwrap();
        assert!(resized.pixels().pixels().all(|p| p.0 == [200, 10, 60, 255]));
    }

    #[test]
    fn zero_target_is_rejected() {
        let source = gradient_image(4, 4);
        assert!(matches!(
            resize_keep_source(&source, 0, 4),
            Err(ConvertError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            scale_with_matrix(&source, 4, 0),
            Err(ConvertError::InvalidDimensions { width: 4, height: 0 })
        ));
    }

    #[test]
    fn oversized_target_is_out_of_memory() {
        let result = resize(gradient_image(2, 2), u32::MAX, u32::MAX);
        assert!(matches!(result, Err(ConvertError::OutOfMemory(_))));
    }

    #[test]
    fn matrix_scale_at_same_even_size_is_identity() {
        let source = gradient_image(16, 10);
        let scaled = scale_with_matrix(&source, 16, 10).unwrap();
        assert_eq!(scaled.pixels(), source.pixels());
    }

    #[test]
    fn matrix_scale_even_source_is_fully_opaque() {
        let scaled = scale_with_matrix(&solid(8, 6, [30, 60, 90, 255]), 21, 5).unwrap();
        assert_eq!(scaled.dimensions(), Dimensions { width: 21, height: 5 });
        assert!(scaled.pixels().pixels().all(|p| p.0 == [30, 60, 90, 255]));
    }

    #[test]
    fn matrix_scale_odd_source_has_soft_left_edge() {
        // 5 wide at scale 1: drawn from x = 0.5, so column 0 is half covered
        let scaled = scale_with_matrix(&solid(5, 4, [255, 0, 0, 255]), 5, 4).unwrap();
        assert_eq!(scaled.pixels().get_pixel(0, 1).0, [255, 0, 0, 128]);
        assert_eq!(scaled.pixels().get_pixel(2, 1).0, [255, 0, 0, 255]);

        // resize has no such edge
        let resized = resize(solid(5, 4, [255, 0, 0, 255]), 5, 4).unwrap();
        assert_eq!(resized.pixels().get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn matrix_scale_upscale_keeps_halves_either_side_of_centre() {
        let source = DecodedImage::new(
            RgbaImage::from_fn(4, 4, |x, _| {
                if x < 2 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
            }),
            None,
        )
        .unwrap();
        let scaled = scale_with_matrix(&source, 8, 8).unwrap();
        let [r, _, b, a] = scaled.pixels().get_pixel(3, 4).0;
        assert!(r > b && a == 255);
        let [r, _, b, a] = scaled.pixels().get_pixel(4, 4).0;
        assert!(b > r && a == 255);
        assert_eq!(scaled.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(scaled.pixels().get_pixel(7, 7).0, [0, 0, 255, 255]);
    }

    #[test]
    fn matrix_scale_keeps_transparent_pixels_transparent() {
        let scaled = scale_with_matrix(&solid(4, 4, [10, 20, 30, 0]), 9, 9).unwrap();
        assert!(scaled.pixels().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn matrix_scale_keeps_source_and_format() {
        let source = DecodedImage::new(
            RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 255])),
            Some(image::ImageFormat::Jpeg),
        )
        .unwrap();
        let scaled = scale_with_matrix(&source, 3, 3).unwrap();
        assert_eq!(scaled.source_format(), Some(image::ImageFormat::Jpeg));
        assert_eq!(source.width(), 6);
    }

    #[test]
    fn overlap_is_clamped_to_one_pixel() {
        assert_eq!(overlap(3.0, 0.0, 10.0), 1.0);
        assert_eq!(overlap(0.0, 0.5, 10.0), 0.5);
        assert_eq!(overlap(12.0, 0.0, 10.0), 0.0);
    }

    proptest! {
        #[test]
        fn resize_always_hits_target(
            src_w in 1u32..40,
            src_h in 1u32..40,
            width in 1u32..64,
            height in 1u32..64,
        ) {
            let resized = resize(gradient_image(src_w, src_h), width, height).unwrap();
            prop_assert_eq!(resized.dimensions(), Dimensions { width, height });
        }

        #[test]
        fn matrix_scale_always_hits_target(
            src_w in 1u32..40,
            src_h in 1u32..40,
            width in 1u32..64,
            height in 1u32..64,
        ) {
            let scaled = scale_with_matrix(&gradient_image(src_w, src_h), width, height).unwrap();
            prop_assert_eq!(scaled.dimensions(), Dimensions { width, height });
        }
    }
}
