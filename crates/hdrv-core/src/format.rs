//! Decoded pixel format description.

use serde::{Deserialize, Serialize};

/// Bit layout of a decoded pixel format, as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelFormat {
    /// Bits per pixel across all channels.
    pub bits_per_pixel: u32,
    /// Bits per color channel.
    pub bits_per_channel: u32,
    /// Channels hold floating point values.
    pub is_float: bool,
}

impl PixelFormat {
    /// 8-bit RGBA.
    pub const RGBA8: Self = Self { bits_per_pixel: 32, bits_per_channel: 8, is_float: false };
    /// 16-bit RGBA.
    pub const RGBA16: Self = Self { bits_per_pixel: 64, bits_per_channel: 16, is_float: false };
    /// Half float RGBA.
    pub const RGBA16F: Self = Self { bits_per_pixel: 64, bits_per_channel: 16, is_float: true };
    /// Single float RGBA.
    pub const RGBA32F: Self = Self { bits_per_pixel: 128, bits_per_channel: 32, is_float: true };

    /// Creates a format from total bits, channel count and float flag.
    pub fn from_layout(bits_per_pixel: u32, channels: u32, is_float: bool) -> Self {
        let bits_per_channel = if channels == 0 { 0 } else { bits_per_pixel / channels };
        Self { bits_per_pixel, bits_per_channel, is_float }
    }

    /// A format the pipeline cannot interpret.
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.bits_per_pixel != 0 && self.bits_per_channel != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_layout() {
        let f = PixelFormat::from_layout(48, 3, false);
        assert_eq!(f.bits_per_channel, 16);
        assert!(f.is_supported());

        let f = PixelFormat::from_layout(32, 0, false);
        assert!(!f.is_supported());
    }
}
