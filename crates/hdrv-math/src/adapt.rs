//! Bradford chromatic adaptation.
//!
//! Used when an embedded profile's white point differs from D65.

use crate::{Mat3, Vec3};

/// D65 white in XYZ (Y = 1).
pub const D65: Vec3 = Vec3::new(0.95047, 1.0, 1.08883);

/// D50 white in XYZ (Y = 1), the ICC profile connection space white.
pub const D50: Vec3 = Vec3::new(0.96422, 1.0, 0.82521);

const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

const BRADFORD_INV: Mat3 = Mat3::from_rows([
    [0.9869929, -0.1470543, 0.1599627],
    [0.4323053, 0.5183603, 0.0492912],
    [-0.0085287, 0.0400428, 0.9684867],
]);

/// XYZ to XYZ adaptation from `src_white` to `dst_white`.
///
/// Returns identity when either white has a zero cone response.
pub fn bradford(src_white: Vec3, dst_white: Vec3) -> Mat3 {
    let src = BRADFORD * src_white;
    let dst = BRADFORD * dst_white;
    if src.x == 0.0 || src.y == 0.0 || src.z == 0.0 {
        return Mat3::IDENTITY;
    }
    BRADFORD_INV * Mat3::diagonal(dst.x / src.x, dst.y / src.y, dst.z / src.z) * BRADFORD
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bradford_maps_white() {
        let m = bradford(D50, D65);
        let w = m * D50;
        assert_abs_diff_eq!(w.x, D65.x, epsilon = 1e-3);
        assert_abs_diff_eq!(w.y, D65.y, epsilon = 1e-3);
        assert_abs_diff_eq!(w.z, D65.z, epsilon = 1e-3);
    }

    #[test]
    fn test_bradford_same_white_is_identity() {
        let m = bradford(D65, D65);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(m.m[i][j], expected, epsilon = 1e-4);
            }
        }
    }
}
