//! Decoder output handed to the pipeline.
//!
//! Container decoding lives outside the pipeline. A loader fills a
//! [`DecodedImage`] and the controller validates and classifies it.

use crate::display::Chromaticity;
use crate::format::PixelFormat;
use serde::{Deserialize, Serialize};

/// The part of an ICC profile the pipeline interprets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedProfile {
    /// Red colorant chromaticity.
    pub red: Chromaticity,
    /// Green colorant chromaticity.
    pub green: Chromaticity,
    /// Blue colorant chromaticity.
    pub blue: Chromaticity,
    /// Profile white point.
    pub white: Chromaticity,
    /// Pure power transfer exponent (decode direction).
    pub gamma: f32,
}

/// Auxiliary single channel gain map.
#[derive(Debug, Clone, PartialEq)]
pub struct GainMap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded gain values in [0, 1], row-major.
    pub data: Vec<f32>,
}

impl GainMap {
    /// Creates a gain map.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Self {
        Self { width, height, data }
    }

    /// Size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A decoded still image plus the container metadata the pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Pixel format reported by the decoder.
    pub format: PixelFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved RGBA. Integer formats hold normalized encoded values,
    /// float formats hold linear scRGB.
    pub pixels: Vec<f32>,
    /// Number of embedded color profiles found in the container.
    pub profile_count: u32,
    /// Interpreted embedded profile, if any.
    pub profile: Option<EmbeddedProfile>,
    /// Container signals BT.2100 PQ out of band.
    pub force_bt2100: bool,
    /// Auxiliary gain map.
    pub gain_map: Option<GainMap>,
}

impl DecodedImage {
    /// Creates an image without profile, override or gain map.
    pub fn new(format: PixelFormat, width: u32, height: u32, pixels: Vec<f32>) -> Self {
        Self {
            format,
            width,
            height,
            pixels,
            profile_count: 0,
            profile: None,
            force_bt2100: false,
            gain_map: None,
        }
    }

    /// Creates an image where every pixel holds `rgba`.
    pub fn solid(format: PixelFormat, width: u32, height: u32, rgba: [f32; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self::new(format, width, height, pixels)
    }

    /// Attaches an interpreted profile.
    pub fn with_profile(mut self, profile: EmbeddedProfile) -> Self {
        self.profile = Some(profile);
        self.profile_count = self.profile_count.max(1);
        self
    }

    /// Attaches a gain map.
    pub fn with_gain_map(mut self, gain_map: GainMap) -> Self {
        self.gain_map = Some(gain_map);
        self
    }

    /// Sets the BT.2100 override.
    pub fn with_bt2100(mut self, force: bool) -> Self {
        self.force_bt2100 = force;
        self
    }

    /// Size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel count.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
