use ndarray::Array2;

use crate::frame::ColorFrame;

use super::sampling::bilinear_sample_clamped;

/// Resize a plane with bilinear interpolation, aligning pixel centres.
///
/// Returns an empty array if either the source or the target is empty.
pub fn resize_bilinear(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 || new_h == 0 || new_w == 0 {
        return Array2::zeros((new_h, new_w));
    }
    if h == new_h && w == new_w {
        return data.clone();
    }

    let scale_y = h as f64 / new_h as f64;
    let scale_x = w as f64 / new_w as f64;

    Array2::from_shape_fn((new_h, new_w), |(row, col)| {
        let src_y = (row as f64 + 0.5) * scale_y - 0.5;
        let src_x = (col as f64 + 0.5) * scale_x - 0.5;
        bilinear_sample_clamped(data, src_y, src_x)
    })
}

/// Resize all three planes of a color frame.
pub fn resize_color(frame: &ColorFrame, new_h: usize, new_w: usize) -> ColorFrame {
    frame.map_planes(|plane| resize_bilinear(plane, new_h, new_w))
}

/// Dimensions after a uniform scale, rounded to the nearest pixel, never
/// below 1.
pub fn scaled_dimensions(height: usize, width: usize, scale: f64) -> (usize, usize) {
    let new_h = ((height as f64 * scale).round() as usize).max(1);
    let new_w = ((width as f64 * scale).round() as usize).max(1);
    (new_h, new_w)
}
