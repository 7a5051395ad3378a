//! Pipeline configuration.
//!
//! Every value has a default, so an empty YAML document is a valid config.
//! The histogram thresholds are empirically tuned and meant to be adjusted
//! here rather than in code.
//!
//! ```yaml
//! histogram:
//!   max_percentile: 0.9999
//!   skip_top_bin: false
//! display:
//!   default_hdr_max_nits: 1000.0
//! ```

use crate::error::{PipelineError, PipelineResult};
use hdrv_core::{
    DEFAULT_HDR_DISPLAY_MAX_NITS, DEFAULT_IMAGE_MAX_CLL_NITS, DEFAULT_SDR_DISPLAY_MAX_NITS, MAX_ZOOM,
    MIN_SPHERE_ZOOM,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Luminance histogram settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Number of bins.
    pub bins: usize,
    /// Power applied to normalized luminance before binning.
    pub gamma: f32,
    /// Luminance mapped to the top of the histogram.
    pub max_nits: f32,
    /// Fraction of pixels at or below the max CLL estimate.
    pub max_percentile: f32,
    /// Fraction of pixels at or below the median estimate.
    pub median_percentile: f32,
    /// Ignore the highest bin, which collects clipped and noisy values.
    pub skip_top_bin: bool,
    /// Longest side of the analysis image.
    pub max_dimension: u32,
    /// Upper bound of the analysis downscale factor.
    pub max_prescale: f32,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 400,
            gamma: 0.1,
            max_nits: 1_000_000.0,
            max_percentile: 0.999,
            median_percentile: 0.5,
            skip_top_bin: true,
            max_dimension: 2048,
            max_prescale: 0.5,
        }
    }
}

/// Fallback luminance values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Peak assumed for HDR displays that report none.
    pub default_hdr_max_nits: f32,
    /// Peak assumed for SDR/WCG displays that report none.
    pub default_sdr_max_nits: f32,
    /// Max CLL assumed for content with unknown metadata.
    pub default_image_max_cll: f32,
    /// Lower bound of the tonemapper's input peak.
    pub min_tonemap_input_nits: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_hdr_max_nits: DEFAULT_HDR_DISPLAY_MAX_NITS,
            default_sdr_max_nits: DEFAULT_SDR_DISPLAY_MAX_NITS,
            default_image_max_cll: DEFAULT_IMAGE_MAX_CLL_NITS,
            min_tonemap_input_nits: DEFAULT_SDR_DISPLAY_MAX_NITS,
        }
    }
}

/// Zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Largest zoom.
    pub max_zoom: f32,
    /// Smallest sphere-map zoom.
    pub min_sphere_zoom: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { max_zoom: MAX_ZOOM, min_sphere_zoom: MIN_SPHERE_ZOOM }
    }
}

/// Gain map reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainMapConfig {
    /// Decode exponent of the stored gain map.
    pub gamma: f32,
    /// Multiplier of the base and linear gain product.
    pub gain: f32,
}

impl Default for GainMapConfig {
    fn default() -> Self {
        Self { gamma: 1.0 / 2.2, gain: 2.0 }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Histogram analysis.
    pub histogram: HistogramConfig,
    /// Display fallbacks.
    pub display: DisplayConfig,
    /// Zoom limits.
    pub view: ViewConfig,
    /// Gain map reconstruction.
    pub gain_map: GainMapConfig,
}

impl PipelineConfig {
    /// Parses and validates YAML.
    pub fn from_yaml_str(yaml: &str) -> PipelineResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| PipelineError::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// Writes the config as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        let path = path.as_ref();
        let text = serde_yaml::to_string(self)
            .map_err(|e| PipelineError::Config(format!("serialize: {e}")))?;
        std::fs::write(path, text).map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    /// Rejects values the pipeline cannot use.
    pub fn validate(&self) -> PipelineResult<()> {
        let h = &self.histogram;
        if h.bins < 2 {
            return Err(PipelineError::Config(format!("histogram.bins must be >= 2, got {}", h.bins)));
        }
        if !(h.gamma > 0.0) || !(h.max_nits > 0.0) {
            return Err(PipelineError::Config("histogram gamma and max_nits must be positive".into()));
        }
        for (name, p) in [("max_percentile", h.max_percentile), ("median_percentile", h.median_percentile)] {
            if !(p > 0.0 && p < 1.0) {
                return Err(PipelineError::Config(format!("histogram.{name} must be in (0, 1), got {p}")));
            }
        }
        if h.max_dimension == 0 || !(h.max_prescale > 0.0 && h.max_prescale <= 1.0) {
            return Err(PipelineError::Config("histogram downscale settings out of range".into()));
        }
        let v = &self.view;
        if !(v.max_zoom > 0.0) || !(v.min_sphere_zoom > 0.0 && v.min_sphere_zoom <= v.max_zoom) {
            return Err(PipelineError::Config("view zoom limits out of range".into()));
        }
        Ok(())
    }
}
