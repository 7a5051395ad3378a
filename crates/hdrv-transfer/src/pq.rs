//! SMPTE ST 2084 perceptual quantizer.
//!
//! Encoded signal in [0, 1] against absolute luminance in [0, 10000] nits.

/// Peak luminance representable by PQ.
pub const L_MAX: f32 = 10000.0;

const M1: f32 = 2610.0 / 16384.0;
const M2: f32 = 2523.0 / 4096.0 * 128.0;
const C1: f32 = 3424.0 / 4096.0;
const C2: f32 = 2413.0 / 4096.0 * 32.0;
const C3: f32 = 2392.0 / 4096.0 * 32.0;

/// Signal to nits.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= 0.0 {
        return 0.0;
    }
    let vp = v.min(1.0).powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = C2 - C3 * vp;
    L_MAX * (num / den).powf(1.0 / M1)
}

/// Nits to signal.
#[inline]
pub fn oetf(nits: f32) -> f32 {
    if nits <= 0.0 {
        return 0.0;
    }
    let yp = (nits / L_MAX).min(1.0).powf(M1);
    ((C1 + C2 * yp) / (1.0 + C3 * yp)).powf(M2)
}
