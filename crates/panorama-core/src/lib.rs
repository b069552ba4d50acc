pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod preprocess;
pub mod stitch;
pub mod transform;
pub mod worker;
