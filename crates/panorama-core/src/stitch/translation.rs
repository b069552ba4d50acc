use ndarray::{s, Array2};
use tracing::debug;

use crate::consts::{MATCH_MAX_WIDTH, MIN_OVERLAP_FRACTION};
use crate::error::Result;
use crate::frame::ColorFrame;
use crate::transform::resize::{resize_bilinear, scaled_dimensions};

use super::mosaic::{blend, Placement};
use super::phase_correlation::{correlate, Offset};
use super::{ComposeOutcome, Compositor, StitchStrategy};

/// Left-to-right sweep: every image continues to the right of the previous
/// one, so horizontal steps never go left.
pub struct PanoramaCompositor;

/// Free 2D translation between neighbours, as for flat scans.
pub struct ScansCompositor;

impl Compositor for PanoramaCompositor {
    fn strategy(&self) -> StitchStrategy {
        StitchStrategy::Panorama
    }

    fn compose(&self, images: &[ColorFrame], confidence_threshold: f32) -> Result<ComposeOutcome> {
        compose_translation(images, confidence_threshold, true)
    }
}

impl Compositor for ScansCompositor {
    fn strategy(&self) -> StitchStrategy {
        StitchStrategy::Scans
    }

    fn compose(&self, images: &[ColorFrame], confidence_threshold: f32) -> Result<ComposeOutcome> {
        compose_translation(images, confidence_threshold, false)
    }
}

/// Luminance planes bounded to [`MATCH_MAX_WIDTH`], plus the factors that
/// map matching-resolution pixels back to full resolution.
fn matching_planes(images: &[ColorFrame]) -> (Vec<Array2<f32>>, f64, f64) {
    let (h, w) = (images[0].height(), images[0].width());
    let scale = (MATCH_MAX_WIDTH as f64 / w as f64).min(1.0);
    let (mh, mw) = scaled_dimensions(h, w, scale);

    let planes = images
        .iter()
        .map(|img| resize_bilinear(&img.luminance(), mh, mw))
        .collect();
    (planes, w as f64 / mw as f64, h as f64 / mh as f64)
}

/// Offsets along one axis congruent to `d` modulo `n` that leave any overlap.
fn axis_candidates(d: f64, n: f64) -> Vec<f64> {
    [d, d - n, d + n].into_iter().filter(|c| c.abs() < n).collect()
}

/// Pearson correlation of the region where `target` overlaps `reference`
/// when shifted by `(dx, dy)`. `None` when the overlap is too thin to score.
fn overlap_score(reference: &Array2<f32>, target: &Array2<f32>, dx: f64, dy: f64) -> Option<f64> {
    let (h, w) = reference.dim();
    let (sx, sy) = (dx.round() as i64, dy.round() as i64);
    let (hi, wi) = (h as i64, w as i64);

    let (x0, x1) = ((-sx).max(0), (wi - sx).min(wi));
    let (y0, y1) = ((-sy).max(0), (hi - sy).min(hi));
    let min_w = ((w as f64 * MIN_OVERLAP_FRACTION).ceil() as i64).max(2);
    let min_h = ((h as f64 * MIN_OVERLAP_FRACTION).ceil() as i64).max(2);
    if x1 - x0 < min_w || y1 - y0 < min_h {
        return None;
    }

    let tgt = target.slice(s![y0 as usize..y1 as usize, x0 as usize..x1 as usize]);
    let rf = reference.slice(s![
        (y0 + sy) as usize..(y1 + sy) as usize,
        (x0 + sx) as usize..(x1 + sx) as usize
    ]);

    let n = tgt.len() as f64;
    let mean_t = tgt.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_r = rf.iter().map(|&v| v as f64).sum::<f64>() / n;
    let (mut cov, mut var_t, mut var_r) = (0.0, 0.0, 0.0);
    for (&t, &r) in tgt.iter().zip(rf.iter()) {
        let (t, r) = (t as f64 - mean_t, r as f64 - mean_r);
        cov += t * r;
        var_t += t * t;
        var_r += r * r;
    }

    let denom = (var_t * var_r).sqrt();
    Some(if denom > 1e-12 { cov / denom } else { 0.0 })
}

/// Pick the placement of `target` relative to `reference` among the offsets
/// the circular correlation surface cannot tell apart.
fn resolve_offset(reference: &Array2<f32>, target: &Array2<f32>, offset: Offset, sweep: bool) -> Offset {
    let (h, w) = (reference.nrows() as f64, reference.ncols() as f64);

    let xs = if sweep {
        // Sub-pixel jitter around zero is kept; real steps go right.
        let forward: Vec<f64> = axis_candidates(offset.dx, w)
            .into_iter()
            .filter(|&c| c > -0.5)
            .collect();
        if forward.is_empty() {
            vec![offset.dx.rem_euclid(w)]
        } else {
            forward
        }
    } else {
        axis_candidates(offset.dx, w)
    };
    let ys = axis_candidates(offset.dy, h);

    let mut best: Option<(f64, Offset)> = None;
    for &dy in &ys {
        for &dx in &xs {
            let Some(score) = overlap_score(reference, target, dx, dy) else {
                continue;
            };
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, Offset { dx, dy }));
            }
        }
    }

    best.map(|(_, o)| o).unwrap_or(Offset {
        dx: xs.first().copied().unwrap_or(offset.dx),
        dy: offset.dy,
    })
}

fn compose_translation(
    images: &[ColorFrame],
    confidence_threshold: f32,
    sweep: bool,
) -> Result<ComposeOutcome> {
    if images.len() < 2 {
        return Ok(ComposeOutcome::Failure(format!(
            "need at least 2 images, got {}",
            images.len()
        )));
    }

    let (h, w) = (images[0].height(), images[0].width());
    if let Some(odd) = images.iter().find(|img| img.height() != h || img.width() != w) {
        return Ok(ComposeOutcome::Failure(format!(
            "image {} is {}x{}, expected {}x{}",
            odd.metadata.position,
            odd.width(),
            odd.height(),
            w,
            h
        )));
    }

    let (planes, scale_x, scale_y) = matching_planes(images);

    let mut placements = Vec::with_capacity(images.len());
    let mut current = Placement::default();
    placements.push(current);

    for i in 1..planes.len() {
        let corr = correlate(&planes[i - 1], &planes[i])?;
        debug!(
            pair = i,
            dx = corr.offset.dx,
            dy = corr.offset.dy,
            confidence = corr.confidence,
            "Pairwise match"
        );

        if corr.confidence < confidence_threshold as f64 {
            return Ok(ComposeOutcome::Failure(format!(
                "images {} and {} match with confidence {:.2}, below threshold {:.2}",
                i,
                i + 1,
                corr.confidence,
                confidence_threshold
            )));
        }

        let step = resolve_offset(&planes[i - 1], &planes[i], corr.offset, sweep);
        debug!(pair = i, dx = step.dx, dy = step.dy, "Resolved step");

        current = Placement {
            x: current.x + step.dx * scale_x,
            y: current.y + step.dy * scale_y,
        };
        placements.push(current);
    }

    match blend(images, &placements) {
        Ok(composite) => Ok(ComposeOutcome::Success(composite)),
        Err(e) => Ok(ComposeOutcome::Failure(format!("cannot build canvas: {e}"))),
    }
}
