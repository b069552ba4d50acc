pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{project_existing, run_pipeline, run_pipeline_bytes, run_pipeline_with};
pub use types::{InputSource, NoOpReporter, PipelineStage, ProgressReporter};
