use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::consts::{PEAK_EXCLUSION_RADIUS, WINDOW_TAPER_FRACTION};
use crate::error::{PanoramaError, Result};

/// Translation between two equally sized planes.
///
/// `target(y, x) ~= reference(y + dy, x + dx)`, modulo the plane size:
/// positive `dx` means the target looks further right than the reference.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

/// Phase-correlation result with a match confidence in [0, 1].
#[derive(Clone, Copy, Debug)]
pub struct Correlation {
    pub offset: Offset,
    pub confidence: f64,
}

/// Estimate the translation between two planes using FFT phase correlation.
///
/// Confidence is `1 - secondary / primary` where `primary` is the highest
/// correlation value and `secondary` the highest outside a small window
/// around it; an unambiguous match scores close to 1.
pub fn correlate(reference: &Array2<f32>, target: &Array2<f32>) -> Result<Correlation> {
    let (h, w) = reference.dim();
    let (th, tw) = target.dim();
    if h != th || w != tw {
        return Err(PanoramaError::InvalidDimensions {
            width: tw,
            height: th,
        });
    }
    if h < 3 || w < 3 {
        return Err(PanoramaError::InvalidDimensions {
            width: w,
            height: h,
        });
    }

    // Only a thin border is tapered; neighbours overlap along those strips.
    let ref_fft = fft2d(&apply_tukey(reference));
    let tgt_fft = fft2d(&apply_tukey(target));

    let correlation = ifft2d(&normalized_cross_power(&ref_fft, &tgt_fft));

    let (peak_row, peak_col, peak_val) = find_peak(&correlation);
    let secondary = secondary_peak(&correlation, peak_row, peak_col, PEAK_EXCLUSION_RADIUS);

    // Signed offset, wrap-around handled
    let dy = if peak_row > h / 2 {
        peak_row as f64 - h as f64
    } else {
        peak_row as f64
    };
    let dx = if peak_col > w / 2 {
        peak_col as f64 - w as f64
    } else {
        peak_col as f64
    };

    let (sub_dy, sub_dx) = refine_peak_paraboloid(&correlation, peak_row, peak_col);

    let confidence = if peak_val > 0.0 {
        (1.0 - secondary.max(0.0) / peak_val).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(Correlation {
        offset: Offset {
            dx: dx + sub_dx,
            dy: dy + sub_dy,
        },
        confidence,
    })
}

/// Flat-top window of length `n`: 1 in the middle, raised-cosine over the
/// outer `WINDOW_TAPER_FRACTION` at each end.
fn tukey(n: usize) -> Vec<f64> {
    let taper = ((n as f64 * WINDOW_TAPER_FRACTION).round() as usize).max(1);
    (0..n)
        .map(|i| {
            let edge = i.min(n - 1 - i);
            if edge >= taper {
                1.0
            } else {
                0.5 * (1.0 - (std::f64::consts::PI * edge as f64 / taper as f64).cos())
            }
        })
        .collect()
}

fn apply_tukey(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let wy = tukey(h);
    let wx = tukey(w);
    Array2::from_shape_fn((h, w), |(row, col)| data[[row, col]] * (wy[row] * wx[col]) as f32)
}

/// 2D FFT: row-wise FFT, then column-wise FFT.
fn fft2d(data: &Array2<f32>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v as f64, 0.0));

    for mut row in result.rows_mut() {
        let mut buf: Vec<Complex<f64>> = row.to_vec();
        fft_row.process(&mut buf);
        row.assign(&ndarray::ArrayView1::from(buf.as_slice()));
    }

    for mut col in result.columns_mut() {
        let mut buf: Vec<Complex<f64>> = col.to_vec();
        fft_col.process(&mut buf);
        col.assign(&ndarray::ArrayView1::from(buf.as_slice()));
    }

    result
}

/// Inverse 2D FFT, real part, normalized.
fn ifft2d(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();

    for mut col in work.columns_mut() {
        let mut buf: Vec<Complex<f64>> = col.to_vec();
        ifft_col.process(&mut buf);
        col.assign(&ndarray::ArrayView1::from(buf.as_slice()));
    }

    for mut row in work.rows_mut() {
        let mut buf: Vec<Complex<f64>> = row.to_vec();
        ifft_row.process(&mut buf);
        row.assign(&ndarray::ArrayView1::from(buf.as_slice()));
    }

    let scale = 1.0 / (h * w) as f64;
    work.mapv(|c| c.re * scale)
}

fn normalized_cross_power(
    ref_fft: &Array2<Complex<f64>>,
    tgt_fft: &Array2<Complex<f64>>,
) -> Array2<Complex<f64>> {
    ndarray::Zip::from(ref_fft)
        .and(tgt_fft)
        .map_collect(|&r, &t| {
            let cross = r * t.conj();
            let mag = cross.norm();
            if mag > 1e-12 {
                cross / mag
            } else {
                Complex::new(0.0, 0.0)
            }
        })
}

fn find_peak(data: &Array2<f64>) -> (usize, usize, f64) {
    let mut best = (0, 0, f64::NEG_INFINITY);
    for ((row, col), &val) in data.indexed_iter() {
        if val > best.2 {
            best = (row, col, val);
        }
    }
    best
}

/// Highest value whose circular distance from the peak exceeds `radius` on
/// either axis.
fn secondary_peak(data: &Array2<f64>, peak_row: usize, peak_col: usize, radius: usize) -> f64 {
    let (h, w) = data.dim();
    let circular = |a: usize, b: usize, n: usize| {
        let d = a.abs_diff(b);
        d.min(n - d)
    };

    let mut best = f64::NEG_INFINITY;
    for ((row, col), &val) in data.indexed_iter() {
        let near = circular(row, peak_row, h) <= radius && circular(col, peak_col, w) <= radius;
        if !near && val > best {
            best = val;
        }
    }
    if best.is_finite() {
        best
    } else {
        0.0
    }
}

/// Paraboloid fit on the 3x3 neighborhood of the peak.
///
/// Returns (delta_row, delta_col) clamped to +/- 0.5 pixel.
fn refine_peak_paraboloid(correlation: &Array2<f64>, peak_row: usize, peak_col: usize) -> (f64, f64) {
    let (h, w) = correlation.dim();

    if peak_row == 0 || peak_row >= h - 1 || peak_col == 0 || peak_col >= w - 1 {
        return (0.0, 0.0);
    }

    let fit = |prev: f64, curr: f64, next: f64| {
        let denom = prev - 2.0 * curr + next;
        if denom.abs() > 1e-12 {
            ((prev - next) / (2.0 * denom)).clamp(-0.5, 0.5)
        } else {
            0.0
        }
    };

    let delta_row = fit(
        correlation[[peak_row - 1, peak_col]],
        correlation[[peak_row, peak_col]],
        correlation[[peak_row + 1, peak_col]],
    );
    let delta_col = fit(
        correlation[[peak_row, peak_col - 1]],
        correlation[[peak_row, peak_col]],
        correlation[[peak_row, peak_col + 1]],
    );

    (delta_row, delta_col)
}
