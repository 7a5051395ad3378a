//! Image-processing stages a device can run.

use hdrv_transfer::Transfer;
use std::fmt;

/// Kind of effect object a device must create before running a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelKind {
    ColorManagement,
    GainMapMerge,
    ColorMatrix,
    HdrTonemap,
    SimpleTonemap,
    WhiteLevelAdjust,
    SdrOverlay,
    LuminanceHeatmap,
    MaxLuminance,
    BorderWrap,
    SphereMap,
    Scale,
    GammaTransfer,
    Histogram,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A kernel with its parameters.
///
/// Matrices are row-major 4x4 acting on column RGBA vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum Kernel {
    /// Decodes the source transfer curve then applies a primaries matrix
    /// into linear scRGB.
    ColorManagement { transfer: Transfer, matrix: [f32; 16] },
    /// Linearizes a gain map (`g^gamma * white_scale`), resamples it to the
    /// base size and multiplies: `out = gain * base * g'`. Inputs: base, gain map.
    GainMapMerge { gamma: f32, white_scale: f32, gain: f32 },
    /// RGBA matrix, with optional clamp of the output to non-negative values.
    ColorMatrix { matrix: [f32; 16], clamp_output: bool },
    /// Luminance tonemap from `input_max_nits` onto `output_max_nits`.
    HdrTonemap { input_max_nits: f32, output_max_nits: f32 },
    /// Per-channel curve from `input_max_nits` onto `output_max_nits`, for
    /// devices without a tonemapper.
    SimpleTonemap { input_max_nits: f32, output_max_nits: f32 },
    /// Linear gain `output_nits / input_nits`.
    WhiteLevelAdjust { input_nits: f32, output_nits: f32 },
    /// Greyscale for SDR-range pixels, color for HDR pixels.
    SdrOverlay,
    /// False color luminance bands.
    LuminanceHeatmap,
    /// Marks pixels brighter than `nits` in red.
    MaxLuminance { nits: f32 },
    /// Switches sampling to wrap-around.
    BorderWrap,
    /// Equirectangular to sphere projection.
    SphereMap { center: [f32; 2], scene_size: [f32; 2], zoom: f32 },
    /// Resamples by `factor`, box filtered when shrinking.
    Scale { factor: f32 },
    /// Per-channel power, `None` leaves the channel untouched.
    GammaTransfer { exponents: [Option<f32>; 4] },
}

impl Kernel {
    /// The effect kind that runs this kernel.
    pub fn kind(&self) -> KernelKind {
        match self {
            Self::ColorManagement { .. } => KernelKind::ColorManagement,
            Self::GainMapMerge { .. } => KernelKind::GainMapMerge,
            Self::ColorMatrix { .. } => KernelKind::ColorMatrix,
            Self::HdrTonemap { .. } => KernelKind::HdrTonemap,
            Self::SimpleTonemap { .. } => KernelKind::SimpleTonemap,
            Self::WhiteLevelAdjust { .. } => KernelKind::WhiteLevelAdjust,
            Self::SdrOverlay => KernelKind::SdrOverlay,
            Self::LuminanceHeatmap => KernelKind::LuminanceHeatmap,
            Self::MaxLuminance { .. } => KernelKind::MaxLuminance,
            Self::BorderWrap => KernelKind::BorderWrap,
            Self::SphereMap { .. } => KernelKind::SphereMap,
            Self::Scale { .. } => KernelKind::Scale,
            Self::GammaTransfer { .. } => KernelKind::GammaTransfer,
        }
    }

    /// Number of input images the kernel consumes.
    pub fn input_count(&self) -> usize {
        match self {
            Self::GainMapMerge { .. } => 2,
            _ => 1,
        }
    }

    /// Diagonal RGB scale that leaves alpha untouched.
    pub fn rgb_scale(scale: f32) -> Self {
        Self::ColorMatrix { matrix: diagonal_rgba(scale), clamp_output: false }
    }
}

/// Row-major RGBA matrix scaling R, G and B.
pub fn diagonal_rgba(scale: f32) -> [f32; 16] {
    [
        scale, 0.0, 0.0, 0.0,
        0.0, scale, 0.0, 0.0,
        0.0, 0.0, scale, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]
}
