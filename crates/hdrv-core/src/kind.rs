//! Advanced color kind and image classification.
//!
//! Every decoded image and every display is one of three kinds. Images are
//! classified from their pixel format and container metadata by
//! [`classify`]; displays report their kind through
//! [`DisplayColorInfo`](crate::DisplayColorInfo).
//!
//! # Rules
//!
//! Applied in order, later rules override earlier ones:
//!
//! | Condition | Kind |
//! |-----------|------|
//! | default | [`StandardDynamicRange`](AdvancedColorKind::StandardDynamicRange) |
//! | more than 8 bits per channel, or an embedded profile | [`WideColorGamut`](AdvancedColorKind::WideColorGamut) |
//! | floating point | [`HighDynamicRange`](AdvancedColorKind::HighDynamicRange) |
//! | BT.2100 override or gain map | [`HighDynamicRange`](AdvancedColorKind::HighDynamicRange) |
//!
//! ```rust
//! use hdrv_core::{classify, AdvancedColorKind, ClassifierInput};
//!
//! let input = ClassifierInput { bits_per_channel: 8, ..Default::default() };
//! assert_eq!(classify(&input), AdvancedColorKind::StandardDynamicRange);
//!
//! let input = ClassifierInput { bits_per_channel: 8, has_gain_map: true, ..Default::default() };
//! assert_eq!(classify(&input), AdvancedColorKind::HighDynamicRange);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color capability class of an image or display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdvancedColorKind {
    /// 8-bit sRGB content or display.
    #[default]
    StandardDynamicRange,
    /// Wider primaries or deeper bit depth, SDR luminance.
    WideColorGamut,
    /// Luminance beyond SDR reference white.
    HighDynamicRange,
}

impl AdvancedColorKind {
    /// UI label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::StandardDynamicRange => "Standard Dynamic Range",
            Self::WideColorGamut => "Wide Color Gamut",
            Self::HighDynamicRange => "High Dynamic Range",
        }
    }

    /// Short identifier, used in logs and CLI output.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::StandardDynamicRange => "sdr",
            Self::WideColorGamut => "wcg",
            Self::HighDynamicRange => "hdr",
        }
    }

    /// True for [`AdvancedColorKind::HighDynamicRange`].
    #[inline]
    pub fn is_hdr(self) -> bool {
        self == Self::HighDynamicRange
    }
}

impl fmt::Display for AdvancedColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierInput {
    /// Bits per color channel.
    pub bits_per_channel: u32,
    /// Pixel format stores floating point values.
    pub is_float: bool,
    /// Number of embedded color profiles in the container.
    pub profile_count: u32,
    /// Container signals BT.2100 (HDR10) out of band.
    pub forced_bt2100: bool,
    /// Container carries an auxiliary gain map.
    pub has_gain_map: bool,
}

/// Classifies an image.
///
/// Total and deterministic over its input, there is no failure case.
pub fn classify(input: &ClassifierInput) -> AdvancedColorKind {
    let mut kind = AdvancedColorKind::StandardDynamicRange;

    if input.bits_per_channel > 8 || input.profile_count >= 1 {
        kind = AdvancedColorKind::WideColorGamut;
    }

    if input.is_float {
        kind = AdvancedColorKind::HighDynamicRange;
    }

    // Some HDR containers travel through 8/10-bit integer codecs.
    if input.forced_bt2100 || input.has_gain_map {
        kind = AdvancedColorKind::HighDynamicRange;
    }

    kind
}
