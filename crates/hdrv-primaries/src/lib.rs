//! # hdrv-primaries
//!
//! RGB primaries, white points and the matrices derived from them.
//!
//! - [`Primaries`] with [`SRGB`], [`DISPLAY_P3`] and [`REC2020`] presets
//! - [`rgb_to_xyz_matrix`] - the normalized primary matrix
//! - [`rgb_to_scrgb_matrix`] - source primaries to working scRGB
//! - [`GamutTransforms`] - display gamut constraint matrices
//!
//! All derivations reject degenerate primaries with [`GamutError`] instead of
//! silently falling back to identity.

#![warn(missing_docs)]

mod error;
mod gamut;

pub use error::{GamutError, GamutResult};
pub use gamut::GamutTransforms;

use hdrv_core::{Chromaticity, DisplayColorInfo, EmbeddedProfile};
use hdrv_math::{bradford, Mat3, Vec3};

/// RGB primaries and white point as CIE 1931 xy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primaries {
    /// Red primary.
    pub r: Chromaticity,
    /// Green primary.
    pub g: Chromaticity,
    /// Blue primary.
    pub b: Chromaticity,
    /// White point.
    pub w: Chromaticity,
}

impl Primaries {
    /// Primaries reported by a display.
    pub fn from_display(info: &DisplayColorInfo) -> Self {
        Self { r: info.red, g: info.green, b: info.blue, w: info.white }
    }

    /// Colorants of an embedded profile.
    pub fn from_profile(profile: &EmbeddedProfile) -> Self {
        Self { r: profile.red, g: profile.green, b: profile.blue, w: profile.white }
    }

    /// White point as XYZ with Y = 1.
    pub fn white_xyz(&self) -> GamutResult<Vec3> {
        xy_to_xyz(self.w)
    }
}

// ============================================================================
// Presets
// ============================================================================

/// D65 white point.
pub const D65_XY: Chromaticity = (0.3127, 0.3290);

/// sRGB / BT.709.
pub const SRGB: Primaries = Primaries {
    r: (0.64, 0.33),
    g: (0.30, 0.60),
    b: (0.15, 0.06),
    w: D65_XY,
};

/// Display P3 (DCI-P3 primaries, D65 white).
pub const DISPLAY_P3: Primaries = Primaries {
    r: (0.680, 0.320),
    g: (0.265, 0.690),
    b: (0.150, 0.060),
    w: D65_XY,
};

/// BT.2020 / BT.2100.
pub const REC2020: Primaries = Primaries {
    r: (0.708, 0.292),
    g: (0.170, 0.797),
    b: (0.131, 0.046),
    w: D65_XY,
};

/// Fixed BT.709 RGB to XYZ matrix.
pub const M709: Mat3 = Mat3::from_rows([
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
]);

/// Fixed XYZ to BT.709 RGB matrix.
pub const XYZ_TO_709: Mat3 = Mat3::from_rows([
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
]);

// ============================================================================
// Matrix derivation
// ============================================================================

/// Converts xy chromaticity to XYZ with Y = 1: `(x/y, 1, (1-x-y)/y)`.
pub fn xy_to_xyz(xy: Chromaticity) -> GamutResult<Vec3> {
    let (x, y) = xy;
    if y == 0.0 || !x.is_finite() || !y.is_finite() {
        return Err(GamutError::InvalidChromaticity { x, y });
    }
    Ok(Vec3::new(x / y, 1.0, (1.0 - x - y) / y))
}

/// Inverts a matrix whose determinant must be strictly positive.
pub(crate) fn invert_positive(m: &Mat3) -> GamutResult<Mat3> {
    let determinant = m.determinant();
    if !(determinant > 0.0) {
        return Err(GamutError::Degenerate { determinant });
    }
    m.inverse().ok_or(GamutError::Degenerate { determinant })
}

/// RGB to XYZ matrix for a set of primaries.
///
/// Primaries become the columns of P, the white point W, and each column is
/// scaled by `S = P^-1 * W` so that RGB (1, 1, 1) lands on the white point.
///
/// ```rust
/// use hdrv_primaries::{rgb_to_xyz_matrix, SRGB, M709};
///
/// let m = rgb_to_xyz_matrix(&SRGB).unwrap();
/// assert!((m.m[1][1] - M709.m[1][1]).abs() < 1e-3);
/// ```
pub fn rgb_to_xyz_matrix(p: &Primaries) -> GamutResult<Mat3> {
    let primaries = Mat3::from_cols(xy_to_xyz(p.r)?, xy_to_xyz(p.g)?, xy_to_xyz(p.b)?);
    let white = p.white_xyz()?;
    let scale = invert_positive(&primaries)? * white;
    Ok(primaries.scale_cols(scale))
}

/// Source RGB to linear BT.709 (scRGB) with Bradford adaptation of the source
/// white to D65. Relative colorimetric: out-of-gamut values pass through.
pub fn rgb_to_scrgb_matrix(p: &Primaries) -> GamutResult<Mat3> {
    let to_xyz = rgb_to_xyz_matrix(p)?;
    let src_white = p.white_xyz()?;
    let d65 = xy_to_xyz(D65_XY)?;
    Ok(XYZ_TO_709 * bradford(src_white, d65) * to_xyz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_xy_to_xyz() {
        let w = xy_to_xyz(D65_XY).unwrap();
        assert_abs_diff_eq!(w.x, 0.95047, epsilon = 1e-3);
        assert_eq!(w.y, 1.0);
        assert_abs_diff_eq!(w.z, 1.08883, epsilon = 1e-3);
        assert!(xy_to_xyz((0.3, 0.0)).is_err());
    }

    #[test]
    fn test_srgb_matches_m709() {
        let m = rgb_to_xyz_matrix(&SRGB).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(m.m[i][j], M709.m[i][j], epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_white_maps_to_white() {
        let m = rgb_to_xyz_matrix(&REC2020).unwrap();
        let w = m * Vec3::ONE;
        let expected = xy_to_xyz(D65_XY).unwrap();
        assert_abs_diff_eq!(w.x, expected.x, epsilon = 1e-4);
        assert_abs_diff_eq!(w.y, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(w.z, expected.z, epsilon = 1e-4);
    }

    #[test]
    fn test_srgb_to_scrgb_is_identity() {
        let m = rgb_to_scrgb_matrix(&SRGB).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(m.m[i][j], expected, epsilon = 2e-3);
            }
        }
    }

    #[test]
    fn test_rec2020_red_outside_709() {
        let m = rgb_to_scrgb_matrix(&REC2020).unwrap();
        let red = m * Vec3::new(1.0, 0.0, 0.0);
        assert!(red.x > 1.0);
        assert!(red.y < 0.0);
    }

    #[test]
    fn test_mirrored_primaries_rejected() {
        // swapping two primaries flips the determinant sign
        let mirrored = Primaries { r: SRGB.g, g: SRGB.r, b: SRGB.b, w: D65_XY };
        assert!(matches!(
            rgb_to_xyz_matrix(&mirrored),
            Err(GamutError::Degenerate { .. })
        ));
    }
}
