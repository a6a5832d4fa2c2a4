//! Combined Positive Score (CPS) analysis of immunohistochemistry images.
//!
//! Two stains are segmented by HSV range thresholds, cleaned up with a morphological
//! opening, traced into boundary contours built on [imageproc], filtered by contour point
//! count and finally counted and scored. The modules follow the pipeline stages in order:
//!
//! ```no_run
//! use cps_analyzer::{AnalysisConfig, load_image, run_analysis, save_image};
//! use std::path::Path;
//!
//! let image = load_image(Path::new("slide.png"))?;
//! let result = run_analysis(&image, &AnalysisConfig::default());
//! println!("CPS: {:.2}", result.cps);
//! save_image(&result.rendered, Path::new("slide_annotated.png"))?;
//! # Ok::<(), cps_analyzer::CpsError>(())
//! ```

pub mod colors;
pub mod config;
pub mod contours;
mod error;
pub mod morphology;
pub mod pipeline;
pub mod rect;
pub mod render;
pub mod score;
pub mod segment;
pub mod threshold;

pub use config::{AnalysisConfig, AreaRange, ChannelConfig, RenderMode, ThresholdRange};
pub use contours::{ContourTracer, Region};
pub use error::{CpsError, Result};
pub use pipeline::{
    AnalysisResult, AnalysisSummary, ChannelReport, estimate_threshold, load_image, run_analysis,
    save_image,
};
pub use segment::Mask;
