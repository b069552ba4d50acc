use ndarray::Array2;

use crate::consts::{EPSILON, MAX_CANVAS_PIXELS};
use crate::error::{PanoramaError, Result};
use crate::frame::ColorFrame;

/// Top-left corner of an image on the mosaic canvas, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

/// Feather weight: distance to the nearest border, horizontally times
/// vertically, so overlaps cross-fade linearly.
fn feather_weights(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        let wy = (r + 1).min(h - r) as f32;
        let wx = (c + 1).min(w - c) as f32;
        wy * wx
    })
}

/// Blend placed images into one canvas covering their bounding box.
///
/// Placements are rounded to whole pixels.
pub fn blend(images: &[ColorFrame], placements: &[Placement]) -> Result<ColorFrame> {
    if images.is_empty() || images.len() != placements.len() {
        return Err(PanoramaError::InvalidDimensions {
            width: 0,
            height: 0,
        });
    }

    let origins: Vec<(i64, i64)> = placements
        .iter()
        .map(|p| (p.y.round() as i64, p.x.round() as i64))
        .collect();

    let min_y = origins.iter().map(|o| o.0).min().unwrap_or(0);
    let min_x = origins.iter().map(|o| o.1).min().unwrap_or(0);
    let max_y = images
        .iter()
        .zip(&origins)
        .map(|(img, o)| o.0 + img.height() as i64)
        .max()
        .unwrap_or(0);
    let max_x = images
        .iter()
        .zip(&origins)
        .map(|(img, o)| o.1 + img.width() as i64)
        .max()
        .unwrap_or(0);

    let canvas_h = (max_y - min_y).max(0) as usize;
    let canvas_w = (max_x - min_x).max(0) as usize;
    if canvas_h == 0 || canvas_w == 0 || canvas_h.saturating_mul(canvas_w) > MAX_CANVAS_PIXELS {
        return Err(PanoramaError::InvalidDimensions {
            width: canvas_w,
            height: canvas_h,
        });
    }

    let mut sums = [
        Array2::<f32>::zeros((canvas_h, canvas_w)),
        Array2::<f32>::zeros((canvas_h, canvas_w)),
        Array2::<f32>::zeros((canvas_h, canvas_w)),
    ];
    let mut weight = Array2::<f32>::zeros((canvas_h, canvas_w));

    for (img, origin) in images.iter().zip(&origins) {
        let (h, w) = (img.height(), img.width());
        let top = (origin.0 - min_y) as usize;
        let left = (origin.1 - min_x) as usize;
        let feather = feather_weights(h, w);

        for (sum, plane) in sums.iter_mut().zip(img.planes()) {
            let mut region = sum.slice_mut(ndarray::s![top..top + h, left..left + w]);
            region.zip_mut_with(&(plane * &feather), |acc, &v| *acc += v);
        }
        let mut region = weight.slice_mut(ndarray::s![top..top + h, left..left + w]);
        region += &feather;
    }

    let [r, g, b] = sums;
    let normalize = |sum: Array2<f32>| {
        ndarray::Zip::from(&sum)
            .and(&weight)
            .map_collect(|&s, &wt| if wt > EPSILON { s / wt } else { 0.0 })
    };
    let depth = images[0].red.original_bit_depth;

    Ok(ColorFrame::from_planes(normalize(r), normalize(g), normalize(b), depth))
}
