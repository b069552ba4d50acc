pub mod equirect;
pub mod resize;
pub mod sampling;

pub use equirect::{project_equirectangular, project_or_resize, Projection, ProjectionMethod};
pub use resize::{resize_bilinear, resize_color, scaled_dimensions};
pub use sampling::bilinear_sample_clamped;
