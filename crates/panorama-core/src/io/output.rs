use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::OUTPUT_PREFIX;
use crate::error::{PanoramaError, Result};
use crate::frame::ColorFrame;

use super::image_io::encode_jpeg;

/// Attempts at finding an unused filename before giving up.
const MAX_NAME_ATTEMPTS: usize = 4;

/// Descriptor of a persisted panorama.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub filename: String,
    pub byte_size: u64,
    pub width: usize,
    pub height: usize,
    pub format: String,
    pub projection: String,
}

/// `panorama_<32 hex>_<YYYYMMDD_HHMMSS>.jpg`
pub fn generate_filename() -> String {
    let token: u128 = rand::thread_rng().gen();
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{OUTPUT_PREFIX}_{token:032x}_{stamp}.jpg")
}

fn create_unique(output_dir: &Path) -> Result<(PathBuf, std::fs::File)> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = output_dir.join(generate_filename());
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(PanoramaError::Encode(format!("{}: {e}", path.display()))),
        }
    }
    Err(PanoramaError::Encode(format!(
        "no free output name in {}",
        output_dir.display()
    )))
}

/// Encode `frame` as JPEG and persist it under `output_dir` with a fresh
/// unique name. A partially written file is removed on failure.
pub fn write_artifact(frame: &ColorFrame, output_dir: &Path, quality: u8) -> Result<OutputArtifact> {
    let bytes = encode_jpeg(frame, quality)?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| PanoramaError::Encode(format!("{}: {e}", output_dir.display())))?;
    let (path, mut file) = create_unique(output_dir)?;

    if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
        drop(file);
        if let Err(rm) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %rm, "Could not remove partial output");
        }
        return Err(PanoramaError::Encode(format!("{}: {e}", path.display())));
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let byte_size = bytes.len() as u64;
    info!(path = %path.display(), byte_size, "Panorama saved");

    Ok(OutputArtifact {
        path,
        filename,
        byte_size,
        width: frame.width(),
        height: frame.height(),
        format: "equirectangular".into(),
        projection: "360_panorama".into(),
    })
}
