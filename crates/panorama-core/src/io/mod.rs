pub mod image_io;
pub mod output;
pub mod validate;

pub use output::{write_artifact, OutputArtifact};
