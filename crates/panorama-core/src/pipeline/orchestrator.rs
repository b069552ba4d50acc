use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::frame::ColorFrame;
use crate::io::image_io::{decode_image, load_image};
use crate::io::output::{write_artifact, OutputArtifact};
use crate::io::validate::check_input_count;
use crate::preprocess::preprocess_images;
use crate::stitch::{create_compositors, stitch_with_fallback, Compositor};
use crate::transform::equirect::{project_or_resize, ProjectionMethod};

use super::config::PanoramaConfig;
use super::types::{InputSource, NoOpReporter, PipelineStage, ProgressReporter};

fn load_inputs(inputs: InputSource, reporter: &Arc<dyn ProgressReporter>) -> Result<Vec<ColorFrame>> {
    reporter.begin_stage(PipelineStage::Loading, Some(inputs.len()));
    let mut images = Vec::with_capacity(inputs.len());

    match inputs {
        InputSource::Paths(paths) => {
            for (i, path) in paths.iter().enumerate() {
                images.push(load_image(path, i + 1)?);
                reporter.advance(i + 1);
            }
        }
        InputSource::Buffers(buffers) => {
            for (i, bytes) in buffers.into_iter().enumerate() {
                images.push(decode_image(&bytes, i + 1)?);
                reporter.advance(i + 1);
            }
        }
    }

    reporter.finish_stage();
    Ok(images)
}

/// Project a composite and persist it, the tail shared by every entry point.
fn project_and_write(
    composite: ColorFrame,
    config: &PanoramaConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<OutputArtifact> {
    reporter.begin_stage(PipelineStage::Projecting, None);
    let projection = project_or_resize(&composite);
    drop(composite);
    if projection.method == ProjectionMethod::ResizeFallback {
        info!("Output is a resized composite, not a spherical projection");
    }
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Writing, None);
    let artifact = write_artifact(&projection.frame, &config.output_dir, config.output.jpeg_quality)?;
    reporter.finish_stage();

    Ok(artifact)
}

/// Run the full pipeline with explicit compositors and a progress reporter.
///
/// Stages run sequentially on the calling thread; each consumes the previous
/// stage's buffers. Nothing is written unless every fatal stage succeeds.
pub fn run_pipeline_with(
    inputs: InputSource,
    config: &PanoramaConfig,
    compositors: &[Arc<dyn Compositor>],
    reporter: Arc<dyn ProgressReporter>,
) -> Result<OutputArtifact> {
    config.validate()?;
    check_input_count(inputs.len())?;

    let images = load_inputs(inputs, &reporter)?;
    info!(count = images.len(), "Loaded images for stitching");

    reporter.begin_stage(PipelineStage::Preprocessing, Some(images.len()));
    let prepared = preprocess_images(images, config.preprocess.working_width);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Stitching, Some(compositors.len()));
    let report = stitch_with_fallback(
        &prepared,
        compositors,
        config.stitching.confidence_threshold,
    )?;
    drop(prepared);
    reporter.finish_stage();
    info!(
        strategy = %report.strategy,
        failed_strategies = report.failures.len(),
        "Composite ready"
    );

    project_and_write(report.composite, config, &reporter)
}

/// Run the full pipeline on eight image files using the configured
/// built-in strategies.
pub fn run_pipeline(inputs: &[PathBuf], config: &PanoramaConfig) -> Result<OutputArtifact> {
    let compositors = create_compositors(&config.stitching.strategies);
    run_pipeline_with(
        InputSource::Paths(inputs.to_vec()),
        config,
        &compositors,
        Arc::new(NoOpReporter),
    )
}

/// Run the full pipeline on eight in-memory encoded images.
pub fn run_pipeline_bytes(buffers: Vec<Vec<u8>>, config: &PanoramaConfig) -> Result<OutputArtifact> {
    let compositors = create_compositors(&config.stitching.strategies);
    run_pipeline_with(
        InputSource::Buffers(buffers),
        config,
        &compositors,
        Arc::new(NoOpReporter),
    )
}

/// Reproject an already stitched image without running the compositors.
pub fn project_existing(
    path: &Path,
    config: &PanoramaConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<OutputArtifact> {
    config.validate()?;
    reporter.begin_stage(PipelineStage::Loading, Some(1));
    let composite = load_image(path, 1)?;
    reporter.finish_stage();
    project_and_write(composite, config, &reporter)
}
