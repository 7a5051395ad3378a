//! Gamut derivation errors.

use thiserror::Error;

/// Result alias for gamut math.
pub type GamutResult<T> = std::result::Result<T, GamutError>;

/// Primaries that cannot produce a valid transform.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GamutError {
    /// A matrix that must be inverted has a non-positive determinant.
    #[error("degenerate primaries: determinant {determinant}")]
    Degenerate {
        /// Offending determinant
        determinant: f32,
    },

    /// Chromaticity with y == 0 or non-finite coordinates.
    #[error("invalid chromaticity ({x}, {y})")]
    InvalidChromaticity {
        /// x coordinate
        x: f32,
        /// y coordinate
        y: f32,
    },
}
