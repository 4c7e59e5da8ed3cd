//! Image pipeline for weather overlay tiles.
//!
//! A decoded PNG passes through an ordered list of stages chosen by data
//! category, then is re-encoded:
//! - `ReplaceColor`: fade a background colour to transparency
//! - `Greyscale`: white with luminance as opacity
//! - `GaussianBlur`: soften hard edges on all channels
//! - `Resample`: Catmull-Rom reconstruction pass

pub mod error;
pub mod raster;
pub mod resample;
pub mod stage;
pub mod table;

pub use crate::error::{PipelineError, TableError};
pub use crate::raster::{Bounds, RasterImage};
pub use crate::stage::{run_stages, Stage};
pub use crate::table::{CategoryPipeline, PipelineTable};
