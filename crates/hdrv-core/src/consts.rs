//! Luminance and view constants shared across the pipeline.

/// Nominal SDR reference white: scRGB 1.0 maps to this many nits.
pub const NOMINAL_WHITE_NITS: f32 = 80.0;

/// Paper white used when exporting HDR content to SDR (ITU-R BT.2408).
pub const DEFAULT_PAPER_WHITE_NITS: f32 = 203.0;

/// Peak luminance assumed for an HDR display that reports none.
pub const DEFAULT_HDR_DISPLAY_MAX_NITS: f32 = 600.0;

/// Peak luminance assumed for an SDR/WCG display that reports none.
pub const DEFAULT_SDR_DISPLAY_MAX_NITS: f32 = 300.0;

/// Max CLL assumed for HDR content whose metadata is unknown.
pub const DEFAULT_IMAGE_MAX_CLL_NITS: f32 = 600.0;

/// Median CLL assumed for content whose metadata is unknown.
pub const DEFAULT_IMAGE_MEDIAN_CLL_NITS: f32 = 80.0;

/// Sentinel for unknown luminance values.
pub const UNKNOWN_NITS: f32 = -1.0;

/// Largest zoom factor, 1.0 is native resolution.
pub const MAX_ZOOM: f32 = 1.0;

/// Smallest zoom factor accepted in sphere-map mode.
pub const MIN_SPHERE_ZOOM: f32 = 0.25;

/// Highest luminance the max-luminance visualization accepts.
pub const MAX_VISUALIZED_NITS: f32 = 10_000.0;

/// BT.709 luma coefficients.
pub const REC709_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Returns BT.709 luma of linear RGB.
#[inline]
pub fn luminance_rec709(rgb: [f32; 3]) -> f32 {
    REC709_LUMA[0] * rgb[0] + REC709_LUMA[1] * rgb[1] + REC709_LUMA[2] * rgb[2]
}

/// Converts scRGB luminance to nits.
#[inline]
pub fn scrgb_to_nits(v: f32) -> f32 {
    v * NOMINAL_WHITE_NITS
}

/// Converts nits to scRGB luminance.
#[inline]
pub fn nits_to_scrgb(nits: f32) -> f32 {
    nits / NOMINAL_WHITE_NITS
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert_relative_eq!(luminance_rec709([1.0, 1.0, 1.0]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nits_scrgb() {
        assert_relative_eq!(scrgb_to_nits(1.0), 80.0);
        assert_relative_eq!(nits_to_scrgb(1000.0), 12.5);
    }
}
