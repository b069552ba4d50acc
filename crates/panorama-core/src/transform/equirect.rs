//! Equirectangular reprojection of a planar composite.
//!
//! The composite's horizontal axis is treated as a full 360° longitude sweep
//! and its vertical axis as a full 180° latitude sweep, whatever its real
//! field of view. Each destination pixel is inverse-mapped to a source
//! coordinate and bilinearly sampled with edge clamping.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::consts::{EQUIRECT_HEIGHT, EQUIRECT_WIDTH};
use crate::error::{PanoramaError, Result};
use crate::frame::{ColorFrame, Frame, FrameMetadata};

use super::resize::resize_color;
use super::sampling::bilinear_sample_clamped;

/// How the final frame was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMethod {
    /// Longitude/latitude inverse remapping.
    Spherical,
    /// Plain resize after the spherical remap failed.
    ResizeFallback,
}

impl std::fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spherical => write!(f, "Spherical"),
            Self::ResizeFallback => write!(f, "Resize fallback"),
        }
    }
}

/// A 4096x2048 frame plus how it was obtained.
#[derive(Clone, Debug)]
pub struct Projection {
    pub frame: ColorFrame,
    pub method: ProjectionMethod,
}

/// Longitude and latitude (radians) of a destination pixel.
pub fn destination_angles(x: usize, y: usize) -> (f64, f64) {
    let theta = (x as f64 / EQUIRECT_WIDTH as f64) * TAU - PI;
    let phi = (y as f64 / EQUIRECT_HEIGHT as f64) * PI - FRAC_PI_2;
    (theta, phi)
}

/// Source (column, row) sampled for destination pixel `(x, y)` when the
/// composite is `src_w` by `src_h`.
pub fn source_coords(x: usize, y: usize, src_w: usize, src_h: usize) -> (f64, f64) {
    let (theta, phi) = destination_angles(x, y);
    let px = (theta + PI) / TAU * src_w as f64;
    let py = (phi + FRAC_PI_2) / PI * src_h as f64;
    (px, py)
}

/// Inverse of [`source_coords`]: destination (x, y) that samples source
/// coordinate `(px, py)`.
pub fn destination_coords(px: f64, py: f64, src_w: usize, src_h: usize) -> (f64, f64) {
    let theta = px / src_w as f64 * TAU - PI;
    let phi = py / src_h as f64 * PI - FRAC_PI_2;
    let x = (theta + PI) / TAU * EQUIRECT_WIDTH as f64;
    let y = (phi + FRAC_PI_2) / PI * EQUIRECT_HEIGHT as f64;
    (x, y)
}

fn allocate_plane() -> Result<Vec<f32>> {
    let len = EQUIRECT_WIDTH * EQUIRECT_HEIGHT;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        PanoramaError::Projection(format!("cannot allocate {len} pixel plane: {e}"))
    })?;
    Ok(buf)
}

/// Map a composite onto the canonical equirectangular grid.
pub fn project_equirectangular(composite: &ColorFrame) -> Result<ColorFrame> {
    let (src_h, src_w) = (composite.height(), composite.width());
    if src_h == 0 || src_w == 0 {
        return Err(PanoramaError::Projection(format!(
            "degenerate composite {src_w}x{src_h}"
        )));
    }

    // Columns depend only on x and rows only on y.
    let cols: Vec<f64> = (0..EQUIRECT_WIDTH)
        .map(|x| source_coords(x, 0, src_w, src_h).0)
        .collect();
    let rows: Vec<f64> = (0..EQUIRECT_HEIGHT)
        .map(|y| source_coords(0, y, src_w, src_h).1)
        .collect();

    let mut out = [allocate_plane()?, allocate_plane()?, allocate_plane()?];
    let planes = composite.planes();

    for &py in &rows {
        for &px in &cols {
            for (buf, plane) in out.iter_mut().zip(planes.iter()) {
                buf.push(bilinear_sample_clamped(plane, py, px));
            }
        }
    }

    let [r, g, b] = out;
    let shape = (EQUIRECT_HEIGHT, EQUIRECT_WIDTH);
    let to_frame = |buf: Vec<f32>, depth: u8| -> Result<Frame> {
        Array2::from_shape_vec(shape, buf)
            .map(|data| Frame::new(data, depth))
            .map_err(|e| PanoramaError::Projection(e.to_string()))
    };

    debug!(src_w, src_h, "Equirectangular remap complete");
    Ok(ColorFrame {
        red: to_frame(r, composite.red.original_bit_depth)?,
        green: to_frame(g, composite.green.original_bit_depth)?,
        blue: to_frame(b, composite.blue.original_bit_depth)?,
        metadata: FrameMetadata::default(),
    })
}

/// Project the composite, falling back to a plain resize to 4096x2048 if the
/// spherical remap fails. The result is always 4096x2048.
pub fn project_or_resize(composite: &ColorFrame) -> Projection {
    match project_equirectangular(composite) {
        Ok(frame) => {
            info!(
                width = EQUIRECT_WIDTH,
                height = EQUIRECT_HEIGHT,
                "Equirectangular projection complete"
            );
            Projection {
                frame,
                method: ProjectionMethod::Spherical,
            }
        }
        Err(e) => {
            warn!(error = %e, "Equirectangular projection failed, using simple resize");
            let mut frame = resize_color(composite, EQUIRECT_HEIGHT, EQUIRECT_WIDTH);
            frame.metadata = FrameMetadata::default();
            Projection {
                frame,
                method: ProjectionMethod::ResizeFallback,
            }
        }
    }
}
