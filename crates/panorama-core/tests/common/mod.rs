use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array2;

use panorama_core::error::{PanoramaError, Result};
use panorama_core::frame::ColorFrame;
use panorama_core::stitch::{ComposeOutcome, Compositor, StitchStrategy};

/// Deterministic white-noise plane in [0, 1).
pub fn noise_plane(h: usize, w: usize, seed: u64) -> Array2<f32> {
    let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    Array2::from_shape_fn((h, w), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 40) as f32 / (1u64 << 24) as f32
    })
}

/// Solid-color frame.
pub fn solid(h: usize, w: usize, rgb: [f32; 3]) -> ColorFrame {
    ColorFrame::from_planes(
        Array2::from_elem((h, w), rgb[0]),
        Array2::from_elem((h, w), rgb[1]),
        Array2::from_elem((h, w), rgb[2]),
        8,
    )
}

/// Gray frame built from a single plane.
pub fn gray(plane: Array2<f32>) -> ColorFrame {
    ColorFrame::from_planes(plane.clone(), plane.clone(), plane, 8)
}

/// `count` overlapping windows of width `w` cut from one noise scene, each
/// `step` pixels to the right of the previous one.
pub fn sweep(count: usize, h: usize, w: usize, step: usize, seed: u64) -> Vec<ColorFrame> {
    let scene = noise_plane(h, w + step * (count - 1), seed);
    (0..count)
        .map(|i| {
            let window = scene
                .slice(ndarray::s![.., i * step..i * step + w])
                .to_owned();
            gray(window)
        })
        .collect()
}

/// Encode a frame as 8-bit PNG bytes.
pub fn encode_png(frame: &ColorFrame) -> Vec<u8> {
    let (h, w) = (frame.height(), frame.width());
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            img.put_pixel(
                col as u32,
                row as u32,
                Rgb([
                    q(frame.red.data[[row, col]]),
                    q(frame.green.data[[row, col]]),
                    q(frame.blue.data[[row, col]]),
                ]),
            );
        }
    }
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

/// Write frames as `img_XX.png` into `dir`, returning the paths in order.
pub fn write_pngs(dir: &Path, frames: &[ColorFrame]) -> Vec<PathBuf> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(format!("img_{i:02}.png"));
            std::fs::write(&path, encode_png(frame)).expect("write png");
            path
        })
        .collect()
}

/// Eight small solid images, usable with stub compositors.
pub fn eight_solid_pngs(dir: &Path) -> Vec<PathBuf> {
    let frames: Vec<ColorFrame> = (0..8).map(|i| solid(8, 12, [i as f32 / 8.0, 0.5, 0.5])).collect();
    write_pngs(dir, &frames)
}

/// Number of entries in a directory (0 if it does not exist).
pub fn dir_len(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Compositor that always reports the same failure.
pub struct FailingCompositor {
    pub strategy: StitchStrategy,
    pub reason: String,
}

impl Compositor for FailingCompositor {
    fn strategy(&self) -> StitchStrategy {
        self.strategy
    }

    fn compose(&self, _images: &[ColorFrame], _threshold: f32) -> Result<ComposeOutcome> {
        Ok(ComposeOutcome::Failure(self.reason.clone()))
    }
}

/// Compositor whose attempt raises an internal error.
pub struct ErroringCompositor {
    pub strategy: StitchStrategy,
}

impl Compositor for ErroringCompositor {
    fn strategy(&self) -> StitchStrategy {
        self.strategy
    }

    fn compose(&self, _images: &[ColorFrame], _threshold: f32) -> Result<ComposeOutcome> {
        Err(PanoramaError::Config("stitcher crashed".into()))
    }
}

/// Compositor whose attempt panics.
pub struct PanickingCompositor {
    pub strategy: StitchStrategy,
}

impl Compositor for PanickingCompositor {
    fn strategy(&self) -> StitchStrategy {
        self.strategy
    }

    fn compose(&self, _images: &[ColorFrame], _threshold: f32) -> Result<ComposeOutcome> {
        panic!("index out of bounds in stitcher")
    }
}

/// Compositor that returns a fixed composite.
pub struct FixedCompositor {
    pub strategy: StitchStrategy,
    pub composite: ColorFrame,
}

impl Compositor for FixedCompositor {
    fn strategy(&self) -> StitchStrategy {
        self.strategy
    }

    fn compose(&self, _images: &[ColorFrame], _threshold: f32) -> Result<ComposeOutcome> {
        Ok(ComposeOutcome::Success(self.composite.clone()))
    }
}

/// Wraps another compositor and logs each call (strategy, threshold).
pub struct RecordingCompositor {
    pub inner: Arc<dyn Compositor>,
    pub calls: Arc<Mutex<Vec<(StitchStrategy, f32)>>>,
}

impl Compositor for RecordingCompositor {
    fn strategy(&self) -> StitchStrategy {
        self.inner.strategy()
    }

    fn compose(&self, images: &[ColorFrame], threshold: f32) -> Result<ComposeOutcome> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((self.inner.strategy(), threshold));
        self.inner.compose(images, threshold)
    }
}
