//! SDR reference white compensation and user exposure.
//!
//! SDR, WCG and gain-map HDR content is output referred: 1.0 means "SDR
//! white", so it is scaled from the nominal 80 nits up to the display's SDR
//! white level. Scene-referred HDR content already encodes absolute
//! luminance and is left alone. Exposure multiplies on top.

use hdrv_core::{AdvancedColorKind, NOMINAL_WHITE_NITS};

/// Inputs of [`white_level_scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteLevelInput {
    /// Image kind.
    pub kind: AdvancedColorKind,
    /// False for HDR recovered from a gain map.
    pub scene_referred: bool,
    /// Display SDR reference white in nits.
    pub sdr_white_nits: f32,
    /// Linear exposure multiplier.
    pub exposure: f32,
}

/// Linear multiplier applied to R, G and B.
///
/// ```rust
/// use hdrv_core::AdvancedColorKind;
/// use hdrv_pipeline::white_level::{white_level_scale, WhiteLevelInput};
///
/// let sdr = WhiteLevelInput {
///     kind: AdvancedColorKind::StandardDynamicRange,
///     scene_referred: true,
///     sdr_white_nits: 240.0,
///     exposure: 1.0,
/// };
/// assert_eq!(white_level_scale(&sdr), 3.0);
/// ```
pub fn white_level_scale(input: &WhiteLevelInput) -> f32 {
    let base = if input.kind == AdvancedColorKind::HighDynamicRange && input.scene_referred {
        1.0
    } else {
        input.sdr_white_nits / NOMINAL_WHITE_NITS
    };
    base * input.exposure
}

/// Exposure slider in stops to a linear multiplier, `2^stops`.
#[inline]
pub fn exposure_from_slider(stops: f32) -> f32 {
    stops.exp2()
}

/// Linear multiplier back to slider stops.
#[inline]
pub fn slider_from_exposure(multiplier: f32) -> f32 {
    multiplier.log2()
}

/// Slider value as a brightness percentage, e.g. "200.0%" for one stop.
pub fn format_exposure(stops: f32) -> String {
    format!("{:.1}%", exposure_from_slider(stops) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(kind: AdvancedColorKind, scene_referred: bool, sdr_white_nits: f32, exposure: f32) -> WhiteLevelInput {
        WhiteLevelInput { kind, scene_referred, sdr_white_nits, exposure }
    }

    #[test]
    fn test_hdr_scene_referred_identity() {
        let i = input(AdvancedColorKind::HighDynamicRange, true, 80.0, 1.0);
        assert_eq!(white_level_scale(&i), 1.0);

        // sdr white is ignored for scene referred HDR
        let i = input(AdvancedColorKind::HighDynamicRange, true, 240.0, 1.0);
        assert_eq!(white_level_scale(&i), 1.0);
    }

    #[test]
    fn test_output_referred_compensation() {
        for kind in [AdvancedColorKind::StandardDynamicRange, AdvancedColorKind::WideColorGamut] {
            assert_relative_eq!(white_level_scale(&input(kind, true, 200.0, 1.0)), 2.5);
        }
        let gain_map = input(AdvancedColorKind::HighDynamicRange, false, 160.0, 1.0);
        assert_relative_eq!(white_level_scale(&gain_map), 2.0);
    }

    #[test]
    fn test_exposure_multiplies() {
        let i = input(AdvancedColorKind::WideColorGamut, true, 160.0, exposure_from_slider(1.0));
        assert_relative_eq!(white_level_scale(&i), 4.0);
        let i = input(AdvancedColorKind::HighDynamicRange, true, 80.0, exposure_from_slider(-2.0));
        assert_relative_eq!(white_level_scale(&i), 0.25);
    }

    #[test]
    fn test_slider_mapping() {
        assert_eq!(exposure_from_slider(0.0), 1.0);
        assert_relative_eq!(slider_from_exposure(8.0), 3.0);
        assert_eq!(format_exposure(0.0), "100.0%");
        assert_eq!(format_exposure(1.0), "200.0%");
        assert_eq!(format_exposure(-1.0), "50.0%");
    }
}
