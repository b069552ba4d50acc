use std::path::PathBuf;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Preprocessing,
    Stitching,
    Projecting,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading images"),
            Self::Preprocessing => write!(f, "Preprocessing"),
            Self::Stitching => write!(f, "Stitching"),
            Self::Projecting => write!(f, "Projecting"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Where a run's images come from. Files are read fully before decoding and
/// never modified.
#[derive(Clone, Debug)]
pub enum InputSource {
    Paths(Vec<PathBuf>),
    Buffers(Vec<Vec<u8>>),
}

impl InputSource {
    pub fn len(&self) -> usize {
        match self {
            Self::Paths(p) => p.len(),
            Self::Buffers(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
