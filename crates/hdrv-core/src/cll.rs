//! Content light level metadata.

use crate::consts::UNKNOWN_NITS;
use serde::{Deserialize, Serialize};

/// Estimated peak and median luminance of an image.
///
/// Both values use [`UNKNOWN_NITS`] (-1) when the estimate is unavailable:
/// SDR/WCG content, a device without histogram support, or an image with
/// no measurable luminance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageCLL {
    /// Approximate 99.9th percentile luminance in nits.
    pub max_nits: f32,
    /// Median luminance in nits.
    pub median_nits: f32,
    /// False when the luminance was recovered from a gain map and is not
    /// calibrated to physical nits.
    pub is_scene_referred: bool,
}

impl ImageCLL {
    /// Unknown metadata.
    pub const UNKNOWN: Self = Self {
        max_nits: UNKNOWN_NITS,
        median_nits: UNKNOWN_NITS,
        is_scene_referred: true,
    };

    /// Creates a measured value.
    pub fn new(max_nits: f32, median_nits: f32, is_scene_referred: bool) -> Self {
        Self { max_nits, median_nits, is_scene_referred }
    }

    /// True if the peak estimate is available.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.max_nits >= 0.0
    }

    /// Peak luminance, or `fallback` when unknown.
    #[inline]
    pub fn max_or(&self, fallback: f32) -> f32 {
        if self.is_known() { self.max_nits } else { fallback }
    }

    /// UI label for the peak value.
    pub fn max_label(&self) -> String {
        nits_label(self.max_nits)
    }

    /// UI label for the median value.
    pub fn median_label(&self) -> String {
        nits_label(self.median_nits)
    }
}

impl Default for ImageCLL {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Formats a luminance for display, "N/A" for the unknown sentinel.
pub fn nits_label(nits: f32) -> String {
    if nits < 0.0 {
        "N/A".to_string()
    } else {
        format!("{nits:.1} nits")
    }
}
