#[allow(dead_code)]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use panorama_core::error::PanoramaError;
use panorama_core::io::OutputArtifact;
use panorama_core::pipeline::config::PanoramaConfig;
use panorama_core::pipeline::{
    project_existing, run_pipeline, run_pipeline_bytes, run_pipeline_with, InputSource,
    NoOpReporter, PipelineStage, ProgressReporter,
};
use panorama_core::stitch::{Compositor, StitchStrategy};
use panorama_core::worker::{PanoramaJob, PanoramaWorker};

use common::{
    dir_len, eight_solid_pngs, encode_png, solid, sweep, write_pngs, FailingCompositor,
    FixedCompositor, PanickingCompositor,
};

fn fixed(composite: panorama_core::frame::ColorFrame) -> Vec<Arc<dyn Compositor>> {
    vec![
        Arc::new(FailingCompositor {
            strategy: StitchStrategy::Panorama,
            reason: "insufficient overlap".into(),
        }),
        Arc::new(FixedCompositor {
            strategy: StitchStrategy::Scans,
            composite,
        }),
    ]
}

fn assert_valid_artifact(artifact: &OutputArtifact) {
    assert!(artifact.path.exists());
    assert_eq!(artifact.width, 4096);
    assert_eq!(artifact.height, 2048);
    assert_eq!(artifact.format, "equirectangular");
    assert_eq!(
        artifact.byte_size,
        std::fs::metadata(&artifact.path).unwrap().len()
    );
    assert!(artifact.filename.starts_with("panorama_"));
    assert!(artifact.filename.ends_with(".jpg"));

    let img = image::open(&artifact.path).unwrap();
    assert_eq!(img.width(), 4096);
    assert_eq!(img.height(), 2048);
}

#[test]
fn test_pipeline_with_stub_compositor_end_to_end() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = eight_solid_pngs(in_dir.path());
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let artifact = run_pipeline_with(
        InputSource::Paths(paths.clone()),
        &config,
        &fixed(solid(100, 400, [0.9, 0.1, 0.1])),
        Arc::new(NoOpReporter),
    )
    .unwrap();

    assert_valid_artifact(&artifact);
    assert_eq!(artifact.path.parent(), Some(out_dir.path()));
    assert_eq!(dir_len(out_dir.path()), 1);

    // Inputs are left untouched.
    assert!(paths.iter().all(|p| p.exists()));

    let rgb = image::open(&artifact.path).unwrap().to_rgb8();
    let px = rgb.get_pixel(2048, 1024);
    assert!(px.0[0] > 200 && px.0[1] < 60 && px.0[2] < 60);
}

#[test]
fn test_corrupt_input_creates_no_artifact() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = eight_solid_pngs(in_dir.path());
    std::fs::write(&paths[3], b"garbage").unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let err = run_pipeline_with(
        InputSource::Paths(paths),
        &config,
        &fixed(solid(10, 10, [0.5, 0.5, 0.5])),
        Arc::new(NoOpReporter),
    )
    .unwrap_err();

    assert!(matches!(err, PanoramaError::Decode { position: 4, .. }));
    assert_eq!(dir_len(out_dir.path()), 0);
}

#[test]
fn test_all_strategies_failing_creates_no_artifact() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = eight_solid_pngs(in_dir.path());
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let compositors: Vec<Arc<dyn Compositor>> = [StitchStrategy::Panorama, StitchStrategy::Scans]
        .into_iter()
        .map(|strategy| {
            Arc::new(FailingCompositor {
                strategy,
                reason: "no matches".into(),
            }) as Arc<dyn Compositor>
        })
        .collect();

    let err = run_pipeline_with(
        InputSource::Paths(paths),
        &config,
        &compositors,
        Arc::new(NoOpReporter),
    )
    .unwrap_err();

    assert!(matches!(err, PanoramaError::Stitch { ref attempts } if attempts.len() == 2));
    assert_eq!(dir_len(out_dir.path()), 0);
}

#[test]
fn test_wrong_input_count_rejected_before_decoding() {
    let out_dir = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let buffers = vec![b"not decoded".to_vec(); 3];

    let err = run_pipeline_bytes(buffers, &config).unwrap_err();
    assert!(matches!(
        err,
        PanoramaError::InvalidInputCount { expected: 8, actual: 3 }
    ));
}

#[test]
fn test_builtin_strategies_on_synthetic_sweep() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = write_pngs(in_dir.path(), &sweep(8, 48, 64, 16, 42));
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let artifact = run_pipeline(&paths, &config).unwrap();
    assert_valid_artifact(&artifact);
}

#[test]
fn test_pipeline_from_buffers() {
    let out_dir = TempDir::new().unwrap();
    let buffers: Vec<Vec<u8>> = sweep(8, 48, 64, 16, 7).iter().map(encode_png).collect();
    let config = PanoramaConfig::with_output_dir(out_dir.path().join("nested"));

    let artifact = run_pipeline_bytes(buffers, &config).unwrap();
    assert_valid_artifact(&artifact);
}

#[test]
fn test_project_existing_image() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = write_pngs(in_dir.path(), &[solid(50, 300, [0.2, 0.7, 0.2])]);
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let artifact = project_existing(&paths[0], &config, Arc::new(NoOpReporter)).unwrap();
    assert_valid_artifact(&artifact);
}

struct CountingReporter {
    stages: AtomicUsize,
    writing_seen: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total: Option<usize>) {
        self.stages.fetch_add(1, Ordering::SeqCst);
        if stage == PipelineStage::Writing {
            self.writing_seen.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_reporter_sees_every_stage() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let paths = eight_solid_pngs(in_dir.path());
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let reporter = Arc::new(CountingReporter {
        stages: AtomicUsize::new(0),
        writing_seen: AtomicUsize::new(0),
    });

    run_pipeline_with(
        InputSource::Paths(paths),
        &config,
        &fixed(solid(20, 40, [0.5, 0.5, 0.5])),
        reporter.clone(),
    )
    .unwrap();

    assert_eq!(reporter.stages.load(Ordering::SeqCst), 5);
    assert_eq!(reporter.writing_seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_runs_stay_isolated() {
    let worker = PanoramaWorker::new(2).unwrap();
    let out_dir = TempDir::new().unwrap();
    let in_a = TempDir::new().unwrap();
    let in_b = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let job_a = PanoramaJob::new(InputSource::Paths(eight_solid_pngs(in_a.path())), config.clone())
        .with_compositors(fixed(solid(64, 128, [1.0, 0.0, 0.0])));
    let job_b = PanoramaJob::new(InputSource::Paths(eight_solid_pngs(in_b.path())), config)
        .with_compositors(fixed(solid(32, 256, [0.0, 0.0, 1.0])));

    let rx_a = worker.submit(job_a);
    let rx_b = worker.submit(job_b);
    let a = rx_a.recv().unwrap().unwrap();
    let b = rx_b.recv().unwrap().unwrap();

    assert_ne!(a.path, b.path);
    assert_eq!(dir_len(out_dir.path()), 2);

    let pa = *image::open(&a.path).unwrap().to_rgb8().get_pixel(100, 100);
    let pb = *image::open(&b.path).unwrap().to_rgb8().get_pixel(100, 100);
    assert!(pa.0[0] > 200 && pa.0[2] < 60, "job a pixel {pa:?}");
    assert!(pb.0[2] > 200 && pb.0[0] < 60, "job b pixel {pb:?}");
}

#[test]
fn test_artifact_serializes_descriptor_fields() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let artifact = run_pipeline_with(
        InputSource::Paths(eight_solid_pngs(in_dir.path())),
        &config,
        &fixed(solid(10, 20, [0.3, 0.3, 0.3])),
        Arc::new(NoOpReporter),
    )
    .unwrap();

    let json = serde_json::to_value(&artifact).unwrap();
    assert_eq!(json["width"], 4096);
    assert_eq!(json["height"], 2048);
    assert_eq!(json["format"], "equirectangular");
    assert_eq!(json["projection"], "360_panorama");
    assert_eq!(json["byte_size"], artifact.byte_size);
}

fn has_marker(bytes: &[u8], marker: u8) -> bool {
    bytes.windows(2).any(|w| w[0] == 0xFF && w[1] == marker)
}

#[test]
fn test_artifact_is_progressive_jpeg() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let artifact = run_pipeline_with(
        InputSource::Paths(eight_solid_pngs(in_dir.path())),
        &config,
        &fixed(solid(30, 90, [0.6, 0.3, 0.1])),
        Arc::new(NoOpReporter),
    )
    .unwrap();

    let bytes = std::fs::read(&artifact.path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    // SOF2 marks a progressive frame, SOF0 a baseline one.
    assert!(has_marker(&bytes, 0xC2));
    assert!(!has_marker(&bytes, 0xC0));
    assert_valid_artifact(&artifact);
}

#[test]
fn test_unwritable_output_dir_is_encode_error() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let blocker = out_dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"occupied").unwrap();
    let config = PanoramaConfig::with_output_dir(&blocker);

    let err = run_pipeline_with(
        InputSource::Paths(eight_solid_pngs(in_dir.path())),
        &config,
        &fixed(solid(10, 20, [0.3, 0.3, 0.3])),
        Arc::new(NoOpReporter),
    )
    .unwrap_err();

    assert!(matches!(err, PanoramaError::Encode(_)), "got {err:?}");
    assert_eq!(dir_len(out_dir.path()), 1);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"occupied");
}

struct PanickingReporter;

impl ProgressReporter for PanickingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total: Option<usize>) {
        if stage == PipelineStage::Stitching {
            panic!("progress sink went away");
        }
    }
}

#[test]
fn test_worker_reports_panicking_job_and_keeps_running() {
    let worker = PanoramaWorker::new(1).unwrap();
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());
    let paths = eight_solid_pngs(in_dir.path());

    let doomed = PanoramaJob::new(InputSource::Paths(paths.clone()), config.clone())
        .with_compositors(fixed(solid(10, 20, [0.3, 0.3, 0.3])))
        .with_reporter(Arc::new(PanickingReporter));
    let err = worker.submit(doomed).recv().unwrap().unwrap_err();
    assert!(matches!(err, PanoramaError::Internal(_)), "got {err:?}");
    assert!(err.to_string().contains("progress sink went away"));
    assert_eq!(dir_len(out_dir.path()), 0);

    let healthy = PanoramaJob::new(InputSource::Paths(paths), config)
        .with_compositors(fixed(solid(10, 20, [0.3, 0.3, 0.3])));
    let artifact = worker.submit(healthy).recv().unwrap().unwrap();
    assert_valid_artifact(&artifact);
}

#[test]
fn test_worker_falls_through_panicking_compositor() {
    let worker = PanoramaWorker::new(1).unwrap();
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let compositors: Vec<Arc<dyn Compositor>> = vec![
        Arc::new(PanickingCompositor {
            strategy: StitchStrategy::Panorama,
        }),
        Arc::new(FixedCompositor {
            strategy: StitchStrategy::Scans,
            composite: solid(10, 20, [0.3, 0.3, 0.3]),
        }),
    ];
    let job = PanoramaJob::new(InputSource::Paths(eight_solid_pngs(in_dir.path())), config)
        .with_compositors(compositors);

    let artifact = worker.submit(job).recv().unwrap().unwrap();
    assert_valid_artifact(&artifact);
}

#[test]
fn test_builtin_strategies_on_low_overlap_sweep() {
    let in_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    // 38 of 128 columns shared, about 30%.
    let paths = write_pngs(in_dir.path(), &sweep(8, 96, 128, 90, 17));
    let config = PanoramaConfig::with_output_dir(out_dir.path());

    let artifact = run_pipeline(&paths, &config).unwrap();
    assert_valid_artifact(&artifact);
}
