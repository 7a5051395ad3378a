//! Exact 3x3 matrices for gamut and luminance transforms.
//!
//! # Convention
//!
//! Row-major storage, column vectors: `out = M * v`. Composition reads right
//! to left, `(A * B) * v == A * (B * v)`.
//!
//! ```rust
//! use hdrv_math::{Mat3, Vec3};
//!
//! let m = Mat3::diagonal(2.0, 3.0, 4.0);
//! assert_eq!(m * Vec3::ONE, Vec3::new(2.0, 3.0, 4.0));
//! ```

use crate::Vec3;
use std::ops::Mul;

/// A 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// Rows.
    pub m: [[f32; 3]; 3],
}

impl Mat3 {
    /// Identity.
    pub const IDENTITY: Self = Self::diagonal(1.0, 1.0, 1.0);

    /// Creates a matrix from rows.
    #[inline]
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { m: rows }
    }

    /// Creates a matrix whose columns are the given vectors.
    #[inline]
    pub fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self::from_rows([
            [c0.x, c1.x, c2.x],
            [c0.y, c1.y, c2.y],
            [c0.z, c1.z, c2.z],
        ])
    }

    /// Diagonal matrix.
    #[inline]
    pub const fn diagonal(d0: f32, d1: f32, d2: f32) -> Self {
        Self::from_rows([[d0, 0.0, 0.0], [0.0, d1, 0.0], [0.0, 0.0, d2]])
    }

    /// Column `i`.
    #[inline]
    pub fn col(&self, i: usize) -> Vec3 {
        Vec3::new(self.m[0][i], self.m[1][i], self.m[2][i])
    }

    /// Multiplies column `i` by `s[i]`.
    pub fn scale_cols(&self, s: Vec3) -> Self {
        let mut out = *self;
        for row in out.m.iter_mut() {
            row[0] *= s.x;
            row[1] *= s.y;
            row[2] *= s.z;
        }
        out
    }

    /// Transpose.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(
            Vec3::from_array(self.m[0]),
            Vec3::from_array(self.m[1]),
            Vec3::from_array(self.m[2]),
        )
    }

    /// Determinant by cofactor expansion along the first row.
    #[inline]
    pub fn determinant(&self) -> f32 {
        let c = self.cofactors();
        self.m[0][0] * c.m[0][0] + self.m[0][1] * c.m[0][1] + self.m[0][2] * c.m[0][2]
    }

    /// Matrix of cofactors, signs applied.
    pub fn cofactors(&self) -> Self {
        let m = &self.m;
        let minor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        Self::from_rows([
            [minor(1, 2, 1, 2), -minor(1, 2, 0, 2), minor(1, 2, 0, 1)],
            [-minor(0, 2, 1, 2), minor(0, 2, 0, 2), -minor(0, 2, 0, 1)],
            [minor(0, 1, 1, 2), -minor(0, 1, 0, 2), minor(0, 1, 0, 1)],
        ])
    }

    /// Inverse via the adjugate, `None` when the determinant is zero or not
    /// finite.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(self.cofactors().transpose() * (1.0 / det))
    }

    /// Applies the matrix to a vector.
    #[inline]
    pub fn transform(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            Vec3::from_array(self.m[0]).dot(v),
            Vec3::from_array(self.m[1]).dot(v),
            Vec3::from_array(self.m[2]).dot(v),
        )
    }

    /// Matrix product `self * other`.
    pub fn mul_mat(&self, other: &Self) -> Self {
        let mut out = [[0.0f32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = Vec3::from_array(self.m[i]).dot(other.col(j));
            }
        }
        Self::from_rows(out)
    }

    /// Expands to a row-major 4x4 RGBA matrix that leaves alpha untouched.
    pub fn to_rgba(&self) -> [f32; 16] {
        let m = &self.m;
        [
            m[0][0], m[0][1], m[0][2], 0.0,
            m[1][0], m[1][1], m[1][2], 0.0,
            m[2][0], m[2][1], m[2][2], 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.transform(rhs)
    }
}

impl Mul for Mat3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

impl Mul<f32> for Mat3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        let mut out = self;
        out.m.iter_mut().flatten().for_each(|v| *v *= rhs);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SRGB_TO_XYZ: Mat3 = Mat3::from_rows([
        [0.4124564, 0.3575761, 0.1804375],
        [0.2126729, 0.7151522, 0.0721750],
        [0.0193339, 0.1191920, 0.9503041],
    ]);

    fn assert_mat_eq(a: &Mat3, b: &Mat3, eps: f32) {
        for (ra, rb) in a.m.iter().zip(b.m.iter()) {
            for (x, y) in ra.iter().zip(rb.iter()) {
                assert_abs_diff_eq!(x, y, epsilon = eps);
            }
        }
    }

    #[test]
    fn test_mat3_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Mat3::IDENTITY * v, v);
        assert_eq!(Mat3::IDENTITY.determinant(), 1.0);
    }

    #[test]
    fn test_mat3_determinant() {
        let m = Mat3::from_rows([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 1.0]]);
        // 2*(3-2) - 0 + 1*(1-3)
        assert_abs_diff_eq!(m.determinant(), 0.0, epsilon = 1e-6);
        assert!(m.inverse().is_none());
        assert!(SRGB_TO_XYZ.determinant() > 0.0);
    }

    #[test]
    fn test_mat3_inverse() {
        let inv = SRGB_TO_XYZ.inverse().unwrap();
        assert_mat_eq(&(SRGB_TO_XYZ * inv), &Mat3::IDENTITY, 1e-5);
        assert_mat_eq(&(inv * SRGB_TO_XYZ), &Mat3::IDENTITY, 1e-5);
    }

    #[test]
    fn test_mat3_cols() {
        let m = Mat3::from_cols(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE, Vec3::ZERO);
        assert_eq!(m.col(0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transpose().m[0], [1.0, 2.0, 3.0]);

        let s = m.scale_cols(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(s.col(0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(s.col(1), Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_mat3_mul_order() {
        let a = Mat3::diagonal(2.0, 1.0, 1.0);
        let b = Mat3::from_rows([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let v = Vec3::new(1.0, 5.0, 7.0);
        assert_eq!((a * b) * v, a * (b * v));
    }

    #[test]
    fn test_mat3_to_rgba() {
        let m = Mat3::diagonal(2.0, 2.0, 2.0).to_rgba();
        assert_eq!(m[0], 2.0);
        assert_eq!(m[5], 2.0);
        assert_eq!(m[10], 2.0);
        assert_eq!(m[15], 1.0);
        assert_eq!(m[3], 0.0);
    }
}
