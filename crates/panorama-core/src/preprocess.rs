use tracing::debug;

use crate::frame::ColorFrame;
use crate::transform::resize::{resize_color, scaled_dimensions};

/// Downscale a single image so its width does not exceed `max_width`.
///
/// The scale factor is `max_width / width`, applied to both dimensions and
/// rounded to the nearest pixel. Images at or below the limit are returned
/// unchanged.
pub fn downscale_to_width(image: ColorFrame, max_width: usize) -> ColorFrame {
    let (h, w) = (image.height(), image.width());
    if w <= max_width || max_width == 0 {
        return image;
    }

    let scale = max_width as f64 / w as f64;
    let (new_h, new_w) = scaled_dimensions(h, w, scale);
    debug!(
        position = image.metadata.position,
        from_w = w,
        from_h = h,
        to_w = new_w,
        to_h = new_h,
        "Downscaling image"
    );
    resize_color(&image, new_h, new_w)
}

/// Bound every image to the working width, consuming the originals.
pub fn preprocess_images(images: Vec<ColorFrame>, max_width: usize) -> Vec<ColorFrame> {
    images
        .into_iter()
        .map(|img| downscale_to_width(img, max_width))
        .collect()
}
