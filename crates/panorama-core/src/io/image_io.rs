use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use ndarray::Array2;
use tracing::debug;

use crate::error::{PanoramaError, Result};
use crate::frame::{ColorFrame, FrameMetadata};

fn bit_depth_of(img: &DynamicImage) -> u8 {
    let color = img.color();
    (color.bits_per_pixel() / color.channel_count() as u16) as u8
}

/// Decode one encoded image into an RGB frame.
///
/// `position` is the 1-based index reported in errors.
pub fn decode_image(bytes: &[u8], position: usize) -> Result<ColorFrame> {
    let img = image::load_from_memory(bytes).map_err(|e| PanoramaError::Decode {
        position,
        reason: e.to_string(),
    })?;

    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return Err(PanoramaError::Decode {
            position,
            reason: "image is empty".into(),
        });
    }

    let depth = bit_depth_of(&img);
    let rgb = img.to_rgb32f();
    let mut red = Array2::<f32>::zeros((h, w));
    let mut green = Array2::<f32>::zeros((h, w));
    let mut blue = Array2::<f32>::zeros((h, w));

    for (col, row, pixel) in rgb.enumerate_pixels() {
        let (r, c) = (row as usize, col as usize);
        red[[r, c]] = pixel.0[0].clamp(0.0, 1.0);
        green[[r, c]] = pixel.0[1].clamp(0.0, 1.0);
        blue[[r, c]] = pixel.0[2].clamp(0.0, 1.0);
    }

    debug!(position, width = w, height = h, bit_depth = depth, "Decoded image");
    Ok(ColorFrame::from_planes(red, green, blue, depth).with_metadata(FrameMetadata {
        position,
        source: None,
    }))
}

/// Decode a sequence of in-memory images, stopping at the first failure.
pub fn decode_images(buffers: &[Vec<u8>]) -> Result<Vec<ColorFrame>> {
    buffers
        .iter()
        .enumerate()
        .map(|(i, bytes)| decode_image(bytes, i + 1))
        .collect()
}

/// Read an image file fully into memory and decode it.
pub fn load_image(path: &Path, position: usize) -> Result<ColorFrame> {
    let bytes = std::fs::read(path).map_err(|e| PanoramaError::Decode {
        position,
        reason: format!("{}: {e}", path.display()),
    })?;
    let mut frame = decode_image(&bytes, position)?;
    frame.metadata.source = Some(path.to_path_buf());
    Ok(frame)
}

/// Load a sequence of image files, stopping at the first failure.
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<ColorFrame>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| load_image(path, i + 1))
        .collect()
}

/// Quantize a color frame to 8-bit RGB.
pub fn to_rgb8(frame: &ColorFrame) -> RgbImage {
    let (h, w) = (frame.height(), frame.width());
    let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let r = quantize(frame.red.data[[row, col]]);
            let g = quantize(frame.green.data[[row, col]]);
            let b = quantize(frame.blue.data[[row, col]]);
            img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
        }
    }
    img
}

/// Encode a color frame as progressive JPEG at the given quality (1-100).
pub fn encode_jpeg(frame: &ColorFrame, quality: u8) -> Result<Vec<u8>> {
    let (w, h) = (frame.width(), frame.height());
    let (Ok(width), Ok(height)) = (u16::try_from(w), u16::try_from(h)) else {
        return Err(PanoramaError::Encode(format!(
            "{w}x{h} exceeds the JPEG dimension limit"
        )));
    };

    let rgb = to_rgb8(frame);
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf, quality);
    encoder.set_progressive(true);
    encoder
        .encode(rgb.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| PanoramaError::Encode(e.to_string()))?;
    Ok(buf)
}
