//! Analysis parameters.
//!
//! Everything a run depends on is carried by an explicit [`AnalysisConfig`] value, which can
//! be built in code or loaded from a JSON file:
//!
//! ```no_run
//! use cps_analyzer::AnalysisConfig;
//! use std::path::Path;
//!
//! let config = AnalysisConfig::from_json_file(Path::new("cps.json"))?;
//! # Ok::<(), cps_analyzer::CpsError>(())
//! ```

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::contours::ContourTracer;
use crate::error::{CpsError, Result};
use crate::morphology::DEFAULT_OPENING_RADIUS;

/// Inclusive HSV bounds, one `[h, s, v]` triple for each end, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl ThresholdRange {
    pub fn new(lower: [f64; 3], upper: [f64; 3]) -> Self {
        Self { lower, upper }
    }

    /// Whether every channel of `hsv` lies within its bounds.
    pub fn contains(&self, hsv: &[f64; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }

    /// Whether some channel has `lower > upper`, which selects no pixel at all.
    pub fn is_crossed(&self) -> bool {
        (0..3).any(|i| self.lower[i] > self.upper[i])
    }
}

impl Default for ThresholdRange {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.2], [1.0, 1.0, 1.0])
    }
}

/// Accepted object size, measured as contour point count.
///
/// The point count is a proxy that depends on the contour tracer's sampling density; it is
/// neither pixel area nor a calibrated perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRange {
    pub min: usize,
    pub max: usize,
}

impl AreaRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, points: usize) -> bool {
        self.min <= points && points <= self.max
    }
}

impl Default for AreaRange {
    fn default() -> Self {
        Self::new(50, 200)
    }
}

/// Segmentation and size filter for one stain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub threshold: ThresholdRange,
    pub area: AreaRange,
}

/// How the result image is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Alpha-blend the per-pixel masks over the original.
    Overlay,
    /// Outline every accepted region with its bounding box.
    #[default]
    BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Positive-marker (DAB) stain.
    pub dab: ChannelConfig,
    /// Nuclear counterstain.
    pub nucleus: ChannelConfig,
    /// Disk radius of the opening applied to both masks. `0` disables the opening.
    pub opening_radius: u8,
    pub tracer: ContourTracer,
    pub mode: RenderMode,
    /// Weight of the recolored copy in overlay mode.
    pub overlay_alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dab: ChannelConfig::default(),
            nucleus: ChannelConfig::default(),
            opening_radius: DEFAULT_OPENING_RADIUS,
            tracer: ContourTracer::default(),
            mode: RenderMode::default(),
            overlay_alpha: 0.5,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Rejects values no stage can work with.
    ///
    /// Crossed threshold ranges and `min > max` area ranges are legal (they select nothing)
    /// and only produce a warning.
    pub fn validate(&self) -> Result<()> {
        for (name, channel) in [("dab", &self.dab), ("nucleus", &self.nucleus)] {
            let mut bounds = channel.threshold.lower.iter().chain(&channel.threshold.upper);
            if bounds.any(|b| !b.is_finite()) {
                return Err(CpsError::InvalidConfig(format!(
                    "{name} threshold bounds must be finite"
                )));
            }
            if channel.threshold.is_crossed() {
                warn!("{name} threshold range is crossed and will select no pixels");
            }
            if channel.area.min > channel.area.max {
                warn!(
                    "{name} area range {}..={} is empty and will reject every object",
                    channel.area.min, channel.area.max
                );
            }
        }

        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(CpsError::InvalidConfig(format!(
                "overlay_alpha must be within [0, 1], got {}",
                self.overlay_alpha
            )));
        }

        Ok(())
    }

    /// Seeds the value bounds from an automatically estimated split point.
    ///
    /// Positive-marker staining is dark, so its value range becomes `[0, t]`; the nuclear
    /// range becomes `[t, 1]`. Hue and saturation bounds are left alone.
    pub fn apply_value_threshold(&mut self, threshold: f64) {
        self.dab.threshold.lower[2] = 0.0;
        self.dab.threshold.upper[2] = threshold;
        self.nucleus.threshold.lower[2] = threshold;
        self.nucleus.threshold.upper[2] = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_presets() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dab.threshold.lower, [0.0, 0.0, 0.2]);
        assert_eq!(config.nucleus.threshold.upper, [1.0, 1.0, 1.0]);
        assert_eq!(config.dab.area, AreaRange::new(50, 200));
        assert_eq!(config.nucleus.area, AreaRange::new(50, 200));
        assert_eq!(config.opening_radius, 3);
        assert_eq!(config.mode, RenderMode::BoundingBox);
        assert_eq!(config.tracer, ContourTracer::MarchingSquares);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn area_range_is_inclusive() {
        let range = AreaRange::new(10, 20);
        assert!(!range.contains(9));
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(21));
        assert!(!AreaRange::new(5, 4).contains(5));
    }

    #[test]
    fn crossed_detection() {
        assert!(!ThresholdRange::default().is_crossed());
        assert!(ThresholdRange::new([0.0, 0.5, 0.0], [1.0, 0.4, 1.0]).is_crossed());
    }

    #[test]
    fn applies_value_threshold() {
        let mut config = AnalysisConfig::default();
        config.dab.threshold.lower[0] = 0.05;
        config.apply_value_threshold(0.42);

        assert_eq!(config.dab.threshold.lower, [0.05, 0.0, 0.0]);
        assert_eq!(config.dab.threshold.upper, [1.0, 1.0, 0.42]);
        assert_eq!(config.nucleus.threshold.lower, [0.0, 0.0, 0.42]);
        assert_eq!(config.nucleus.threshold.upper, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn rejects_invalid_alpha() {
        let config = AnalysisConfig {
            overlay_alpha: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CpsError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let mut config = AnalysisConfig::default();
        config.nucleus.threshold.upper[1] = f64::NAN;
        assert!(matches!(config.validate(), Err(CpsError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{ "mode": "overlay", "dab": { "area": { "min": 10, "max": 90 } } }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.mode, RenderMode::Overlay);
        assert_eq!(config.dab.area, AreaRange::new(10, 90));
        assert_eq!(config.dab.threshold, ThresholdRange::default());
        assert_eq!(config.nucleus, ChannelConfig::default());
        assert_eq!(config.overlay_alpha, 0.5);
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("cps-config-{}.json", std::process::id()));
        let mut config = AnalysisConfig::default();
        config.tracer = ContourTracer::BorderFollowing;
        config.nucleus.area = AreaRange::new(1, 2);

        config.to_json_file(&path).unwrap();
        let loaded = AnalysisConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }
}
