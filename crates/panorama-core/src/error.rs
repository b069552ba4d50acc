use thiserror::Error;

use crate::stitch::StitchStrategy;

/// One failed stitch strategy and why it failed.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyFailure {
    pub strategy: StitchStrategy,
    pub reason: String,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

fn join_failures(attempts: &[StrategyFailure]) -> String {
    if attempts.is_empty() {
        return "no strategies configured".into();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum PanoramaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Image {position} unreadable: {reason}")]
    Decode { position: usize, reason: String },

    #[error("Stitching failed with all strategies ({})", join_failures(.attempts))]
    Stitch { attempts: Vec<StrategyFailure> },

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("Exactly {expected} images required, {actual} received")]
    InvalidInputCount { expected: usize, actual: usize },

    #[error("Image {position}: unsupported extension ({extension})")]
    UnsupportedExtension { position: usize, extension: String },

    #[error("Image {position}: file too large ({size_mb:.1}MB > {limit_mb}MB)")]
    FileTooLarge {
        position: usize,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("Image {position}: content is not a recognized image")]
    UnrecognizedContent { position: usize },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message carried by a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl PanoramaError {
    /// Whether the error ends a pipeline run. Projection errors are absorbed
    /// by the resize fallback and never reach a caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Projection(_))
    }
}

pub type Result<T> = std::result::Result<T, PanoramaError>;
