pub mod config;
pub mod project;
pub mod stitch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use panorama_core::pipeline::config::PanoramaConfig;
use tracing::debug;

/// Load a TOML config file, or start from defaults.
pub fn load_config(path: Option<&Path>) -> Result<PanoramaConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            debug!(path = %path.display(), "Loading config");
            toml::from_str(&contents).context("Invalid panorama config")
        }
        None => Ok(PanoramaConfig::default()),
    }
}

/// Apply a command-line output directory over the config's.
pub fn apply_output_dir(config: &mut PanoramaConfig, output_dir: &Option<PathBuf>) {
    if let Some(dir) = output_dir {
        config.output_dir = dir.clone();
    }
}
