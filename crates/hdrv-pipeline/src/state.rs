//! Controller state and user render options.

use crate::graph::RenderMode;
use crate::white_level::exposure_from_slider;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the loaded image and its device resources.
///
/// ```text
/// Uninitialized -> LoadFailed
///               -> NeedsGpuResources <-> Ready
/// ```
///
/// Every load re-enters at `Uninitialized`. Device loss moves `Ready` back to
/// `NeedsGpuResources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    /// No image, or a load in progress.
    #[default]
    Uninitialized,
    /// The last image was rejected. Nothing is drawn.
    LoadFailed,
    /// Image accepted, device objects missing.
    NeedsGpuResources,
    /// Device objects exist, drawing is possible.
    Ready,
}

impl PipelineState {
    /// True when a valid image is loaded, whether or not device objects exist.
    pub fn has_image(self) -> bool {
        matches!(self, Self::NeedsGpuResources | Self::Ready)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::LoadFailed => "load failed",
            Self::NeedsGpuResources => "needs gpu resources",
            Self::Ready => "ready",
        };
        f.write_str(s)
    }
}

/// Options set from the UI command surface.
///
/// They survive image loads and device loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Visualization.
    pub mode: RenderMode,
    /// Exposure slider in stops, the multiplier is `2^stops`.
    pub exposure_stops: f32,
    /// Peak luminance override in nits, 0 uses the display's value.
    pub target_max_nits: f32,
    /// Clip colors outside the display gamut.
    pub constrain_gamut: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::None,
            exposure_stops: 0.0,
            target_max_nits: 0.0,
            constrain_gamut: true,
        }
    }
}

impl RenderOptions {
    /// Linear exposure multiplier.
    #[inline]
    pub fn exposure(&self) -> f32 {
        exposure_from_slider(self.exposure_stops)
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_exposure_stops(mut self, stops: f32) -> Self {
        self.exposure_stops = stops;
        self
    }

    pub fn with_target_max_nits(mut self, nits: f32) -> Self {
        self.target_max_nits = nits;
        self
    }

    pub fn with_constrain_gamut(mut self, constrain: bool) -> Self {
        self.constrain_gamut = constrain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = RenderOptions::default();
        assert_eq!(o.mode, RenderMode::None);
        assert_eq!(o.exposure(), 1.0);
        assert!(o.constrain_gamut);
        assert_eq!(PipelineState::default(), PipelineState::Uninitialized);
    }

    #[test]
    fn test_builders() {
        let o = RenderOptions::default()
            .with_mode(RenderMode::HdrTonemap)
            .with_exposure_stops(2.0)
            .with_constrain_gamut(false);
        assert_eq!(o.mode, RenderMode::HdrTonemap);
        assert_eq!(o.exposure(), 4.0);
        assert!(!o.constrain_gamut);
    }

    #[test]
    fn test_has_image() {
        assert!(PipelineState::Ready.has_image());
        assert!(PipelineState::NeedsGpuResources.has_image());
        assert!(!PipelineState::LoadFailed.has_image());
    }
}
