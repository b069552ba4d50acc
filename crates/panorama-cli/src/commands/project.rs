use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use panorama_core::io::validate::is_supported_extension;
use panorama_core::pipeline::project_existing;

use crate::progress::BarReporter;
use crate::summary::print_artifact;

use super::{apply_output_dir, load_config};

#[derive(Args)]
pub struct ProjectArgs {
    /// Stitched image to reproject
    pub file: PathBuf,

    /// Panorama config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the panorama is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the artifact descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &ProjectArgs) -> Result<()> {
    if !is_supported_extension(&args.file) {
        bail!("Unsupported image extension: {}", args.file.display());
    }
    let mut config = load_config(args.config.as_deref())?;
    apply_output_dir(&mut config, &args.output_dir);

    let reporter = Arc::new(BarReporter::new()?);
    if args.json {
        reporter.hide();
    }

    let artifact = match project_existing(&args.file, &config, reporter.clone()) {
        Ok(artifact) => artifact,
        Err(e) => {
            reporter.abandon();
            return Err(e).with_context(|| format!("Failed to project {}", args.file.display()));
        }
    };
    reporter.finish("Done");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
    } else {
        print_artifact(&artifact);
    }
    Ok(())
}
