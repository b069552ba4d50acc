use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_JPEG_QUALITY, DEFAULT_WORKING_WIDTH};
use crate::error::{PanoramaError, Result};
use crate::stitch::StitchStrategy;

/// Everything a pipeline run needs besides its inputs. Built once at startup
/// and passed in explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanoramaConfig {
    /// Directory the final JPEG is written to.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    #[serde(default)]
    pub stitching: StitchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static"),
            preprocess: PreprocessConfig::default(),
            stitching: StitchingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PanoramaConfig {
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Reject settings no pipeline run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.preprocess.working_width == 0 {
            return Err(PanoramaError::Config("working_width must be positive".into()));
        }
        let t = self.stitching.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(PanoramaError::Config(format!(
                "confidence_threshold must be within [0, 1], got {t}"
            )));
        }
        if self.stitching.strategies.is_empty() {
            return Err(PanoramaError::Config(
                "at least one stitch strategy is required".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(PanoramaError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.output.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Images wider than this are downscaled, preserving aspect ratio.
    pub working_width: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            working_width: DEFAULT_WORKING_WIDTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StitchingConfig {
    /// Tried in order; the first success wins.
    pub strategies: Vec<StitchStrategy>,
    pub confidence_threshold: f32,
}

impl Default for StitchingConfig {
    fn default() -> Self {
        Self {
            strategies: vec![StitchStrategy::Panorama, StitchStrategy::Scans],
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}
