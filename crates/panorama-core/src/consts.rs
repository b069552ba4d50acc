/// Number of photographs a panorama is built from.
pub const REQUIRED_IMAGE_COUNT: usize = 8;

/// Images wider than this are downscaled before stitching.
pub const DEFAULT_WORKING_WIDTH: usize = 2000;

/// Default pairwise match confidence a compositor must reach.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Width of the canonical equirectangular output.
pub const EQUIRECT_WIDTH: usize = 4096;

/// Height of the canonical equirectangular output.
pub const EQUIRECT_HEIGHT: usize = 2048;

/// JPEG quality used for the final artifact.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Upper bound on a single input file, in bytes (50 MiB).
pub const MAX_INPUT_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Accepted input file extensions (lowercase, without dot).
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Filename prefix of every output artifact.
pub const OUTPUT_PREFIX: &str = "panorama";

/// Images are downsampled to at most this width for phase correlation.
pub const MATCH_MAX_WIDTH: usize = 512;

/// Half-size of the window around the primary correlation peak that is
/// excluded when searching for the secondary peak.
pub const PEAK_EXCLUSION_RADIUS: usize = 3;

/// Fraction of each border tapered by the phase-correlation window.
pub const WINDOW_TAPER_FRACTION: f64 = 0.08;

/// Smallest overlap, as a fraction of the plane size on each axis, for which
/// a candidate offset is scored.
pub const MIN_OVERLAP_FRACTION: f64 = 0.05;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Largest mosaic canvas a built-in compositor will allocate.
pub const MAX_CANVAS_PIXELS: usize = 64_000_000;
