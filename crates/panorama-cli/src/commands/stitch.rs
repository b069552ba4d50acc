use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use panorama_core::io::validate::validate_input_files;
use panorama_core::pipeline::config::PanoramaConfig;
use panorama_core::pipeline::InputSource;
use panorama_core::stitch::StitchStrategy;
use panorama_core::worker::{PanoramaJob, PanoramaWorker};

use crate::progress::BarReporter;
use crate::summary::{print_artifact, print_stitch_summary};

use super::{apply_output_dir, load_config};

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Panorama,
    Scans,
}

impl From<StrategyArg> for StitchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Panorama => StitchStrategy::Panorama,
            StrategyArg::Scans => StitchStrategy::Scans,
        }
    }
}

#[derive(Args)]
pub struct StitchArgs {
    /// The eight input images, in capture order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Panorama config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the panorama is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Comma-separated stitch strategies, tried in order
    #[arg(long, value_enum, value_delimiter = ',')]
    pub strategy: Vec<StrategyArg>,

    /// Minimum pairwise match confidence (0-1)
    #[arg(long)]
    pub confidence: Option<f32>,

    /// Images wider than this are downscaled before stitching
    #[arg(long)]
    pub working_width: Option<usize>,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value = "1")]
    pub threads: usize,

    /// Print the artifact descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

fn build_config(args: &StitchArgs) -> Result<PanoramaConfig> {
    let mut config = load_config(args.config.as_deref())?;
    apply_output_dir(&mut config, &args.output_dir);
    if !args.strategy.is_empty() {
        config.stitching.strategies = args.strategy.iter().map(|&s| s.into()).collect();
    }
    if let Some(confidence) = args.confidence {
        config.stitching.confidence_threshold = confidence;
    }
    if let Some(width) = args.working_width {
        config.preprocess.working_width = width;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: &StitchArgs) -> Result<()> {
    let config = build_config(args)?;
    validate_input_files(&args.files)?;

    if !args.json {
        print_stitch_summary(&config, &args.files);
    }

    let worker = PanoramaWorker::new(args.threads)?;
    let reporter = Arc::new(BarReporter::new()?);
    if args.json {
        reporter.hide();
    }

    let job = PanoramaJob::new(InputSource::Paths(args.files.clone()), config)
        .with_reporter(reporter.clone());
    let result = worker
        .submit(job)
        .recv()
        .context("Panorama worker stopped unexpectedly")?;

    match result {
        Ok(artifact) => {
            reporter.finish("Done");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&artifact)?);
            } else {
                print_artifact(&artifact);
            }
            Ok(())
        }
        Err(e) => {
            reporter.abandon();
            Err(e).context("Panorama stitching failed")
        }
    }
}
