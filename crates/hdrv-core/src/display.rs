//! Display color capabilities.

use crate::consts::NOMINAL_WHITE_NITS;
use crate::kind::AdvancedColorKind;
use serde::{Deserialize, Serialize};

/// CIE 1931 xy chromaticity.
pub type Chromaticity = (f32, f32);

/// Snapshot of the current monitor's color state.
///
/// Supplied by the platform on connect and whenever the display's color
/// state changes. Any change invalidates cached gamut matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayColorInfo {
    /// Red primary.
    pub red: Chromaticity,
    /// Green primary.
    pub green: Chromaticity,
    /// Blue primary.
    pub blue: Chromaticity,
    /// White point.
    pub white: Chromaticity,
    /// Peak luminance in nits, 0 when the display does not report it.
    pub max_luminance_nits: f32,
    /// Current color mode of the display.
    pub kind: AdvancedColorKind,
    /// SDR reference white in nits.
    pub sdr_white_nits: f32,
}

const SRGB_RED: Chromaticity = (0.64, 0.33);
const SRGB_GREEN: Chromaticity = (0.30, 0.60);
const SRGB_BLUE: Chromaticity = (0.15, 0.06);
const P3_RED: Chromaticity = (0.680, 0.320);
const P3_GREEN: Chromaticity = (0.265, 0.690);
const P3_BLUE: Chromaticity = (0.150, 0.060);
const D65: Chromaticity = (0.3127, 0.3290);

impl DisplayColorInfo {
    /// sRGB panel in SDR mode.
    pub fn sdr() -> Self {
        Self {
            red: SRGB_RED,
            green: SRGB_GREEN,
            blue: SRGB_BLUE,
            white: D65,
            max_luminance_nits: 270.0,
            kind: AdvancedColorKind::StandardDynamicRange,
            sdr_white_nits: NOMINAL_WHITE_NITS,
        }
    }

    /// Display P3 panel with color management enabled, SDR luminance.
    pub fn wcg() -> Self {
        Self {
            red: P3_RED,
            green: P3_GREEN,
            blue: P3_BLUE,
            white: D65,
            max_luminance_nits: 400.0,
            kind: AdvancedColorKind::WideColorGamut,
            sdr_white_nits: NOMINAL_WHITE_NITS,
        }
    }

    /// Display P3 panel in HDR mode with the given peak.
    pub fn hdr(max_luminance_nits: f32) -> Self {
        Self {
            red: P3_RED,
            green: P3_GREEN,
            blue: P3_BLUE,
            white: D65,
            max_luminance_nits,
            kind: AdvancedColorKind::HighDynamicRange,
            sdr_white_nits: 240.0,
        }
    }

    /// Returns a copy with a different SDR white level.
    pub fn with_sdr_white(mut self, nits: f32) -> Self {
        self.sdr_white_nits = nits;
        self
    }

    /// Returns a copy with a different peak luminance.
    pub fn with_max_luminance(mut self, nits: f32) -> Self {
        self.max_luminance_nits = nits;
        self
    }

    /// True when the display is in HDR mode.
    #[inline]
    pub fn is_hdr(&self) -> bool {
        self.kind.is_hdr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!DisplayColorInfo::sdr().is_hdr());
        assert_eq!(DisplayColorInfo::wcg().kind, AdvancedColorKind::WideColorGamut);
        let hdr = DisplayColorInfo::hdr(1000.0);
        assert!(hdr.is_hdr());
        assert_eq!(hdr.max_luminance_nits, 1000.0);
    }

    #[test]
    fn test_builders() {
        let info = DisplayColorInfo::sdr().with_sdr_white(200.0).with_max_luminance(0.0);
        assert_eq!(info.sdr_white_nits, 200.0);
        assert_eq!(info.max_luminance_nits, 0.0);
    }
}
