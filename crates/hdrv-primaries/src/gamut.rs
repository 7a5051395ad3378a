//! Display gamut constraint matrices.
//!
//! The scene-to-panel matrix re-expresses scRGB in the panel's native RGB,
//! where a clamp to non-negative values pins out-of-gamut colors to the panel
//! boundary. The panel-to-scene matrix undoes the change of basis so values
//! that were in gamut come back unchanged.

use crate::{invert_positive, rgb_to_xyz_matrix, GamutResult, Primaries, M709};
use hdrv_core::DisplayColorInfo;
use hdrv_math::Mat3;

/// Forward and inverse gamut matrices for one display snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutTransforms {
    /// scRGB to panel RGB, output is clamped by the consuming stage.
    pub scene_to_panel: Mat3,
    /// Panel RGB back to scRGB, not clamped.
    pub panel_to_scene: Mat3,
}

impl GamutTransforms {
    /// Solves the transforms for a set of display primaries.
    ///
    /// ```rust
    /// use hdrv_primaries::{GamutTransforms, DISPLAY_P3};
    ///
    /// let t = GamutTransforms::solve(&DISPLAY_P3).unwrap();
    /// let round_trip = t.panel_to_scene * t.scene_to_panel;
    /// assert!((round_trip.m[0][0] - 1.0).abs() < 1e-4);
    /// ```
    pub fn solve(display: &Primaries) -> GamutResult<Self> {
        let panel_to_xyz = rgb_to_xyz_matrix(display)?;
        let xyz_to_panel = invert_positive(&panel_to_xyz)?;
        let scene_to_panel = xyz_to_panel * M709;
        let panel_to_scene = invert_positive(&scene_to_panel)?;
        Ok(Self { scene_to_panel, panel_to_scene })
    }

    /// Solves the transforms for a display snapshot.
    pub fn for_display(info: &DisplayColorInfo) -> GamutResult<Self> {
        Self::solve(&Primaries::from_display(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GamutError, DISPLAY_P3, REC2020, SRGB};
    use approx::assert_abs_diff_eq;
    use hdrv_math::Vec3;

    fn assert_vec_eq(a: Vec3, b: Vec3, eps: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = eps);
        assert_abs_diff_eq!(a.y, b.y, epsilon = eps);
        assert_abs_diff_eq!(a.z, b.z, epsilon = eps);
    }

    #[test]
    fn test_srgb_display_is_near_identity() {
        let t = GamutTransforms::solve(&SRGB).unwrap();
        let v = Vec3::new(0.2, 0.5, 0.9);
        assert_vec_eq(t.scene_to_panel * v, v, 2e-3);
    }

    #[test]
    fn test_round_trip_in_gamut() {
        let colors = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.8, 0.1, 0.3),
            Vec3::new(12.5, 10.0, 8.0),
        ];
        for display in [SRGB, DISPLAY_P3, REC2020] {
            let t = GamutTransforms::solve(&display).unwrap();
            for c in colors {
                assert_vec_eq(t.panel_to_scene * (t.scene_to_panel * c), c, 1e-3 * c.max_element().max(1.0));
            }
        }
    }

    #[test]
    fn test_709_red_inside_p3() {
        let t = GamutTransforms::solve(&DISPLAY_P3).unwrap();
        let red = t.scene_to_panel * Vec3::new(1.0, 0.0, 0.0);
        assert!(red.x > 0.0 && red.x < 1.0);
        assert!(red.y >= -1e-4);
        assert!(red.z >= -1e-4);
    }

    #[test]
    fn test_for_display_uses_snapshot() {
        let info = DisplayColorInfo::wcg();
        assert_eq!(
            GamutTransforms::for_display(&info).unwrap(),
            GamutTransforms::solve(&DISPLAY_P3).unwrap()
        );
    }

    #[test]
    fn test_degenerate_display_rejected() {
        let info = DisplayColorInfo { green: (0.3, 0.0), ..DisplayColorInfo::sdr() };
        assert!(matches!(
            GamutTransforms::for_display(&info),
            Err(GamutError::InvalidChromaticity { .. })
        ));
    }
}
