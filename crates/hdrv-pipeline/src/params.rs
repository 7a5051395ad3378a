//! Stage parameters.
//!
//! Every kernel is a pure function of a [`RenderContext`] snapshot, so the
//! controller recomputes them on each draw instead of patching live effects.

use crate::config::PipelineConfig;
use crate::graph::{StageId, StageNode};
use crate::state::RenderOptions;
use crate::view::ViewState;
use crate::white_level::{white_level_scale, WhiteLevelInput};
use hdrv_compute::{Kernel, KernelKind};
use hdrv_core::{
    DecodedImage, DisplayColorInfo, ImageCLL, ImageInfo, MAX_VISUALIZED_NITS, NOMINAL_WHITE_NITS,
};
use hdrv_math::Mat3;
use hdrv_primaries::{rgb_to_scrgb_matrix, GamutTransforms, Primaries, REC2020};
use hdrv_transfer::Transfer;
use tracing::warn;

/// Source encoding handled by the color management stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEncoding {
    /// BT.2100 PQ with Rec.2020 primaries.
    Bt2100Pq { to_scrgb: Mat3 },
    /// Embedded profile primaries and power curve.
    Profile { to_scrgb: Mat3, gamma: f32 },
    /// Linear scRGB.
    Linear,
    /// sRGB.
    Srgb,
}

impl SourceEncoding {
    /// Picks the encoding: BT.2100 override, embedded profile, float, sRGB.
    ///
    /// A profile with degenerate primaries is ignored.
    pub fn from_image(image: &DecodedImage) -> Self {
        if image.force_bt2100 {
            if let Ok(to_scrgb) = rgb_to_scrgb_matrix(&REC2020) {
                return Self::Bt2100Pq { to_scrgb };
            }
        }
        if let Some(profile) = &image.profile {
            match rgb_to_scrgb_matrix(&Primaries::from_profile(profile)) {
                Ok(to_scrgb) => return Self::Profile { to_scrgb, gamma: profile.gamma },
                Err(e) => warn!(%e, "embedded profile ignored"),
            }
        }
        if image.format.is_float { Self::Linear } else { Self::Srgb }
    }

    /// Color management kernel into linear scRGB.
    pub fn kernel(&self) -> Kernel {
        let (transfer, matrix) = match *self {
            Self::Bt2100Pq { to_scrgb } => (Transfer::Pq, to_scrgb),
            Self::Profile { to_scrgb, gamma } => (Transfer::Gamma(gamma), to_scrgb),
            Self::Linear => (Transfer::Linear, Mat3::IDENTITY),
            Self::Srgb => (Transfer::Srgb, Mat3::IDENTITY),
        };
        Kernel::ColorManagement { transfer, matrix: matrix.to_rgba() }
    }

    /// Short description.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bt2100Pq { .. } => "BT.2100 PQ",
            Self::Profile { .. } => "embedded profile",
            Self::Linear => "linear scRGB",
            Self::Srgb => "sRGB",
        }
    }
}

/// Immutable inputs of one parameter pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub info: &'a ImageInfo,
    pub cll: ImageCLL,
    pub source: &'a SourceEncoding,
    /// `None` for an unknown display.
    pub display: Option<&'a DisplayColorInfo>,
    pub options: &'a RenderOptions,
    pub view: &'a ViewState,
    pub config: &'a PipelineConfig,
    pub gamut: Option<&'a GamutTransforms>,
}

impl RenderContext<'_> {
    /// Unknown displays are treated as HDR.
    pub fn display_is_hdr(&self) -> bool {
        self.display.is_none_or(|d| d.is_hdr())
    }

    /// Display SDR white, nominal for unknown displays.
    pub fn sdr_white_nits(&self) -> f32 {
        self.display.map_or(NOMINAL_WHITE_NITS, |d| d.sdr_white_nits)
    }

    /// Reported display peak, 0 when unknown.
    pub fn display_max_nits(&self) -> f32 {
        self.display.map_or(0.0, |d| d.max_luminance_nits)
    }

    /// Peak to tonemap onto: override, display, then a default per display kind.
    pub fn target_max_nits(&self) -> f32 {
        if self.options.target_max_nits > 0.0 {
            return self.options.target_max_nits;
        }
        let reported = self.display_max_nits();
        if reported > 0.0 {
            reported
        } else if self.display_is_hdr() {
            self.config.display.default_hdr_max_nits
        } else {
            self.config.display.default_sdr_max_nits
        }
    }

    /// Content peak fed to the tonemapper, brightened by exposure.
    pub fn tonemap_input_nits(&self) -> f32 {
        let cll = self.cll.max_or(self.config.display.default_image_max_cll);
        (cll * self.options.exposure()).max(self.config.display.min_tonemap_input_nits)
    }

    /// White-scale multiplier.
    pub fn white_level(&self) -> f32 {
        white_level_scale(&WhiteLevelInput {
            kind: self.info.kind(),
            scene_referred: self.info.is_scene_referred(),
            sdr_white_nits: self.sdr_white_nits(),
            exposure: self.options.exposure(),
        })
    }

    /// Kernel for a graph stage.
    pub fn kernel(&self, stage: &StageNode) -> Kernel {
        match stage.id {
            StageId::ColorManagement => self.source.kernel(),
            StageId::GainMapMerge => Kernel::GainMapMerge {
                gamma: self.config.gain_map.gamma,
                white_scale: NOMINAL_WHITE_NITS / self.sdr_white_nits(),
                gain: self.config.gain_map.gain,
            },
            StageId::WhiteScale => Kernel::rgb_scale(self.white_level()),
            StageId::Tonemap => {
                let input_max_nits = self.tonemap_input_nits();
                let output_max_nits = self.target_max_nits();
                if stage.kind == KernelKind::HdrTonemap {
                    Kernel::HdrTonemap { input_max_nits, output_max_nits }
                } else {
                    Kernel::SimpleTonemap { input_max_nits, output_max_nits }
                }
            }
            StageId::SdrWhiteScale => {
                let target = self.target_max_nits();
                Kernel::WhiteLevelAdjust {
                    input_nits: target.min(self.tonemap_input_nits()),
                    output_nits: NOMINAL_WHITE_NITS,
                }
            }
            StageId::SdrOverlay => Kernel::SdrOverlay,
            StageId::LuminanceHeatmap => Kernel::LuminanceHeatmap,
            StageId::MaxLuminance => Kernel::MaxLuminance {
                nits: self.display_max_nits().clamp(NOMINAL_WHITE_NITS, MAX_VISUALIZED_NITS),
            },
            StageId::BorderWrap => Kernel::BorderWrap,
            StageId::SphereMap => Kernel::SphereMap {
                center: self.view.sphere_center,
                scene_size: self.view.scene_size(),
                zoom: self.view.sphere_zoom,
            },
            StageId::GamutToPanel => Kernel::ColorMatrix {
                matrix: self.gamut.map_or(Mat3::IDENTITY, |g| g.scene_to_panel).to_rgba(),
                clamp_output: true,
            },
            StageId::GamutToScene => Kernel::ColorMatrix {
                matrix: self.gamut.map_or(Mat3::IDENTITY, |g| g.panel_to_scene).to_rgba(),
                clamp_output: false,
            },
        }
    }
}
