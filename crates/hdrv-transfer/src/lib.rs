//! # hdrv-transfer
//!
//! Decoding curves for source color spaces the viewer understands.
//!
//! | Curve | Encoded range | Linear output |
//! |-------|---------------|---------------|
//! | [`Transfer::Srgb`] | [0, 1] | [0, 1], 1.0 = SDR white |
//! | [`Transfer::Pq`] | [0, 1] | scRGB, 1.0 = 80 nits |
//! | [`Transfer::Gamma`] | [0, 1] | [0, 1] |
//! | [`Transfer::Linear`] | any | unchanged |

#![warn(missing_docs)]

pub mod pq;
pub mod srgb;

use serde::{Deserialize, Serialize};

/// Nits represented by scRGB 1.0.
pub const SCRGB_WHITE_NITS: f32 = 80.0;

/// Transfer characteristic of a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transfer {
    /// Already linear.
    Linear,
    /// sRGB piecewise curve.
    Srgb,
    /// ST 2084, decoded to scRGB units.
    Pq,
    /// Pure power with the given decode exponent.
    Gamma(f32),
}

impl Transfer {
    /// Decodes one encoded channel value to linear light.
    #[inline]
    pub fn decode(self, v: f32) -> f32 {
        match self {
            Self::Linear => v,
            Self::Srgb => srgb::eotf(v),
            Self::Pq => pq::eotf(v) / SCRGB_WHITE_NITS,
            Self::Gamma(g) => {
                if v <= 0.0 { 0.0 } else { v.powf(g) }
            }
        }
    }

    /// Encodes linear light, inverse of [`Transfer::decode`].
    #[inline]
    pub fn encode(self, l: f32) -> f32 {
        match self {
            Self::Linear => l,
            Self::Srgb => srgb::oetf(l),
            Self::Pq => pq::oetf(l * SCRGB_WHITE_NITS),
            Self::Gamma(g) => {
                if l <= 0.0 || g == 0.0 { 0.0 } else { l.powf(1.0 / g) }
            }
        }
    }
}
