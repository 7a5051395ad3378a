//! Embedded ICC profile interpretation.
//!
//! Only matrix/TRC RGB profiles are interpreted: the three colorant tags
//! give the primaries, their sum the PCS-relative white, and the red tone
//! curve is reduced to a single effective power.

use hdrv_core::{Chromaticity, EmbeddedProfile};
use lcms2::{ColorSpaceSignature, Profile, Tag, TagSignature, ToneCurveRef};
use tracing::debug;

/// Residual tolerance for the pure power fit of a tone curve.
const GAMMA_PRECISION: f64 = 0.01;

/// Interprets an embedded profile, `None` when it is not a usable RGB
/// matrix profile.
pub fn parse(data: &[u8]) -> Option<EmbeddedProfile> {
    let profile = match Profile::new_icc(data) {
        Ok(profile) => profile,
        Err(e) => {
            debug!(error = %e, "ICC profile rejected");
            return None;
        }
    };
    if profile.color_space() != ColorSpaceSignature::RgbData {
        return None;
    }

    let r = colorant(&profile, TagSignature::RedColorantTag)?;
    let g = colorant(&profile, TagSignature::GreenColorantTag)?;
    let b = colorant(&profile, TagSignature::BlueColorantTag)?;
    let white = [r[0] + g[0] + b[0], r[1] + g[1] + b[1], r[2] + g[2] + b[2]];
    let gamma = match profile.read_tag(TagSignature::RedTRCTag) {
        Tag::ToneCurve(curve) => trc_gamma(curve)?,
        _ => return None,
    };

    Some(EmbeddedProfile {
        red: chromaticity(r)?,
        green: chromaticity(g)?,
        blue: chromaticity(b)?,
        white: chromaticity(white)?,
        gamma,
    })
}

fn colorant(profile: &Profile, sig: TagSignature) -> Option<[f32; 3]> {
    match profile.read_tag(sig) {
        Tag::CIEXYZ(xyz) => Some([xyz.X as f32, xyz.Y as f32, xyz.Z as f32]),
        _ => None,
    }
}

fn chromaticity(xyz: [f32; 3]) -> Option<Chromaticity> {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if !(sum > 0.0) {
        return None;
    }
    Some((xyz[0] / sum, xyz[1] / sum))
}

/// Exponent of the pure power curve closest to the tag. Curves a power law
/// fits poorly fall back to the exponent that agrees at mid grey.
fn trc_gamma(curve: &ToneCurveRef) -> Option<f32> {
    if let Some(gamma) = curve.estimated_gamma(GAMMA_PRECISION).filter(|g| *g > 0.0) {
        return Some(gamma as f32);
    }
    let mid: f32 = curve.eval(0.5f32);
    (mid > 0.0 && mid < 1.0).then(|| mid.ln() / 0.5f32.ln())
}
