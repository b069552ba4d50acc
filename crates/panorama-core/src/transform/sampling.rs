use ndarray::Array2;

/// Bilinear sample with edge clamping: coordinates outside the plane read
/// the nearest border pixel. Never wraps horizontally.
///
/// `data` must be non-empty.
pub fn bilinear_sample_clamped(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    let max_y = (h - 1) as f64;
    let max_x = (w - 1) as f64;

    // NaN reads the first row/column.
    let y = if y.is_nan() { 0.0 } else { y.clamp(0.0, max_y) };
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };

    let y0 = y.floor() as usize;
    let x0 = x.floor() as usize;
    let y1 = (y0 + 1).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);

    let fy = (y - y0 as f64) as f32;
    let fx = (x - x0 as f64) as f32;

    let v00 = data[[y0, x0]];
    let v10 = data[[y0, x1]];
    let v01 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}
