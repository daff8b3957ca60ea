//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest dimensions that fit inside `bounds` while keeping
/// the source aspect ratio.
///
/// One side matches its bound exactly, the other is at most its bound.
/// Neither side drops below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (width, height)
///
/// # Examples
/// ```
/// # use image_converter::imaging::calculate_fit_dimensions;
/// // 4000x3000 landscape into a 800x800 box → 800x600
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (800, 800)), (800, 600));
///
/// // 1000x2000 portrait into a 300x300 box → 150x300
/// assert_eq!(calculate_fit_dimensions((1000, 2000), (300, 300)), (150, 300));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = max_w as f64 / max_h as f64;

    if src_aspect > box_aspect {
        // Source is wider: width is the limit
        let w = max_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(1))
    } else {
        // Source is taller: height is the limit
        let h = max_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(1), h)
    }
}
