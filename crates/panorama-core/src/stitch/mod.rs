//! Panoramic composition: the pluggable compositor capability, the built-in
//! translation compositors and the strategy fallback chain.

pub mod mosaic;
pub mod orchestrator;
pub mod phase_correlation;
pub mod translation;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::ColorFrame;

pub use orchestrator::{stitch_with_fallback, StitchReport};
pub use translation::{PanoramaCompositor, ScansCompositor};

/// Identifier of one compositor configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchStrategy {
    /// Wide field-of-view sweep.
    #[default]
    Panorama,
    /// Flat, scanned-document style mosaics.
    Scans,
}

impl std::fmt::Display for StitchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Panorama => write!(f, "Panorama"),
            Self::Scans => write!(f, "Scans"),
        }
    }
}

/// What a compositor reports for one attempt.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum ComposeOutcome {
    Success(ColorFrame),
    Failure(String),
}

/// A panoramic composition capability.
///
/// Given an ordered image sequence, either produce one composite or report
/// why not. `confidence_threshold` is the minimum pairwise match agreement;
/// its exact meaning is owned by the implementation. Returning `Err` is
/// treated the same as `Ok(ComposeOutcome::Failure(..))`.
pub trait Compositor: Send + Sync {
    fn strategy(&self) -> StitchStrategy;

    fn compose(&self, images: &[ColorFrame], confidence_threshold: f32) -> Result<ComposeOutcome>;
}

/// Build the built-in compositor for a strategy.
pub fn create_compositor(strategy: StitchStrategy) -> Arc<dyn Compositor> {
    match strategy {
        StitchStrategy::Panorama => Arc::new(PanoramaCompositor),
        StitchStrategy::Scans => Arc::new(ScansCompositor),
    }
}

/// Built-in compositors for a list of strategies, order preserved.
pub fn create_compositors(strategies: &[StitchStrategy]) -> Vec<Arc<dyn Compositor>> {
    strategies.iter().map(|&s| create_compositor(s)).collect()
}
