use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::consts::{MAX_INPUT_FILE_BYTES, REQUIRED_IMAGE_COUNT, SUPPORTED_EXTENSIONS};
use crate::error::{PanoramaError, Result};

/// Lowercased extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_supported_extension(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Check that exactly [`REQUIRED_IMAGE_COUNT`] inputs were given.
pub fn check_input_count(actual: usize) -> Result<()> {
    if actual != REQUIRED_IMAGE_COUNT {
        return Err(PanoramaError::InvalidInputCount {
            expected: REQUIRED_IMAGE_COUNT,
            actual,
        });
    }
    Ok(())
}

/// Bytes read from the head of a file to sniff its format.
const SNIFF_LEN: u64 = 32;

/// Whether the leading bytes identify one of the accepted image formats.
pub fn has_image_signature(head: &[u8]) -> bool {
    matches!(
        image::guess_format(head),
        Ok(ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff)
    )
}

fn read_head(path: &Path) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(head)
}

/// Boundary checks on input files before they reach the pipeline:
/// count, extension, size and content signature. Full decoding is left to
/// the loader.
pub fn validate_input_files(paths: &[PathBuf]) -> Result<()> {
    check_input_count(paths.len())?;

    for (i, path) in paths.iter().enumerate() {
        let position = i + 1;
        if !is_supported_extension(path) {
            return Err(PanoramaError::UnsupportedExtension {
                position,
                extension: format!(".{}", extension_of(path)),
            });
        }

        let size = std::fs::metadata(path)?.len();
        if size > MAX_INPUT_FILE_BYTES {
            return Err(PanoramaError::FileTooLarge {
                position,
                size_mb: size as f64 / (1024.0 * 1024.0),
                limit_mb: MAX_INPUT_FILE_BYTES / (1024 * 1024),
            });
        }

        if !has_image_signature(&read_head(path)?) {
            return Err(PanoramaError::UnrecognizedContent { position });
        }
    }

    Ok(())
}
