use ndarray::Array2;
use std::path::PathBuf;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};

/// A single image plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Where a decoded image came from.
#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    /// 1-based position in the input sequence (0 for derived images).
    pub position: usize,
    pub source: Option<PathBuf>,
}

/// RGB image composed of separate channel planes.
///
/// All three planes always share the same shape.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
    pub metadata: FrameMetadata,
}

impl ColorFrame {
    pub fn new(red: Frame, green: Frame, blue: Frame) -> Self {
        Self {
            red,
            green,
            blue,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame whose three planes are the given arrays.
    pub fn from_planes(red: Array2<f32>, green: Array2<f32>, blue: Array2<f32>, bit_depth: u8) -> Self {
        Self::new(
            Frame::new(red, bit_depth),
            Frame::new(green, bit_depth),
            Frame::new(blue, bit_depth),
        )
    }

    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }

    /// Zero-area frames are rejected at decode time.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn planes(&self) -> [&Array2<f32>; 3] {
        [&self.red.data, &self.green.data, &self.blue.data]
    }

    /// Apply the same plane transform to R, G and B, keeping metadata.
    pub fn map_planes<F>(&self, mut f: F) -> ColorFrame
    where
        F: FnMut(&Array2<f32>) -> Array2<f32>,
    {
        ColorFrame {
            red: Frame::new(f(&self.red.data), self.red.original_bit_depth),
            green: Frame::new(f(&self.green.data), self.green.original_bit_depth),
            blue: Frame::new(f(&self.blue.data), self.blue.original_bit_depth),
            metadata: self.metadata.clone(),
        }
    }

    /// BT.601 luminance plane.
    pub fn luminance(&self) -> Array2<f32> {
        &self.red.data * LUMINANCE_R + &self.green.data * LUMINANCE_G + &self.blue.data * LUMINANCE_B
    }
}
