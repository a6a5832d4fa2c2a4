use std::path::Path;

use image::RgbImage;
use log::{debug, info, warn};
use serde::Serialize;

use crate::colors::{HsvImage, to_hsv};
use crate::config::{AnalysisConfig, ChannelConfig, RenderMode};
use crate::contours::{ContourTracer, Region, extract_regions, filter_by_point_count};
use crate::error::{CpsError, Result};
use crate::morphology::open_mask;
use crate::render::{render_bounding_boxes, render_overlay};
use crate::score::combined_positive_score;
use crate::segment::{Mask, segment};
use crate::threshold::estimate_value_threshold;

/// Segmentation outcome for one stain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    /// Thresholded and opened mask.
    pub mask: Mask,
    /// Regions that passed the point-count filter.
    pub regions: Vec<Region>,
}

impl ChannelReport {
    /// Number of accepted regions.
    pub fn count(&self) -> usize {
        self.regions.len()
    }
}

/// Counts and score of a run, without the image payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub dab_count: usize,
    pub nucleus_count: usize,
    pub cps: f64,
}

/// Everything produced by one [`run_analysis`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub dab: ChannelReport,
    pub nucleus: ChannelReport,
    /// Combined Positive Score in `[0, 100]`.
    pub cps: f64,
    pub rendered: RgbImage,
}

impl AnalysisResult {
    /// Accepted positive-marker regions.
    pub fn dab_count(&self) -> usize {
        self.dab.count()
    }

    /// Accepted nuclear regions.
    pub fn nucleus_count(&self) -> usize {
        self.nucleus.count()
    }

    /// Counts and score, ready for JSON output.
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            dab_count: self.dab_count(),
            nucleus_count: self.nucleus_count(),
            cps: self.cps,
        }
    }
}

/// Opens and decodes an image file as 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| CpsError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image.to_rgb8())
}

/// Writes an image, with the format picked from the file extension.
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| CpsError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved result image to {}", path.display());
    Ok(())
}

/// Suggests a value-channel split point for seeding the threshold ranges.
///
/// See [`AnalysisConfig::apply_value_threshold`] for how the value is meant to be used.
pub fn estimate_threshold(image: &RgbImage) -> Result<f64> {
    let threshold = estimate_value_threshold(&to_hsv(image))?;
    info!("estimated value threshold {threshold:.3}");
    Ok(threshold)
}

/// Runs segmentation, counting, rendering and scoring on one image.
///
/// The result depends only on `image` and `config`; repeated calls with the same inputs
/// give identical results.
pub fn run_analysis(image: &RgbImage, config: &AnalysisConfig) -> AnalysisResult {
    let hsv = to_hsv(image);

    let dab = analyze_channel("dab", &hsv, &config.dab, config.opening_radius, config.tracer);
    let nucleus = analyze_channel(
        "nucleus",
        &hsv,
        &config.nucleus,
        config.opening_radius,
        config.tracer,
    );

    let rendered = match config.mode {
        RenderMode::Overlay => render_overlay(image, &dab.mask, &nucleus.mask, config.overlay_alpha),
        RenderMode::BoundingBox => render_bounding_boxes(image, &dab.regions, &nucleus.regions),
    };

    let cps = combined_positive_score(dab.count(), nucleus.count());
    info!(
        "positive: {}, nuclei: {}, CPS: {cps:.2}",
        dab.count(),
        nucleus.count()
    );

    AnalysisResult {
        dab,
        nucleus,
        cps,
        rendered,
    }
}

fn analyze_channel(
    name: &str,
    hsv: &HsvImage,
    channel: &ChannelConfig,
    opening_radius: u8,
    tracer: ContourTracer,
) -> ChannelReport {
    if channel.threshold.is_crossed() {
        warn!("{name} threshold range is crossed; no pixel can match");
    }

    let raw = segment(hsv, &channel.threshold);
    let mask = open_mask(&raw, opening_radius);
    let regions = extract_regions(&mask, tracer);
    let traced = regions.len();
    let regions = filter_by_point_count(regions, &channel.area);

    debug!(
        "{name}: {} px thresholded, {} px after opening, {traced} regions, {} accepted",
        raw.count(),
        mask.count(),
        regions.len()
    );

    ChannelReport { mask, regions }
}
