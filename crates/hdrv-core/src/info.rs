//! Per-image information and load results.
//!
//! [`ImageInfo`] is assembled by [`ImageInfoBuilder`] and cannot be changed
//! once built. A new load replaces it wholesale.

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::kind::{classify, AdvancedColorKind, ClassifierInput};
use crate::source::DecodedImage;
use serde::{Deserialize, Serialize};

/// Properties of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageInfo {
    format: PixelFormat,
    width: u32,
    height: u32,
    profile_count: u32,
    kind: AdvancedColorKind,
    forced_bt2100: bool,
    has_gain_map: bool,
    gain_map_size: (u32, u32),
    is_valid: bool,
}

impl ImageInfo {
    /// An empty, invalid info.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Starts building an info.
    pub fn builder() -> ImageInfoBuilder {
        ImageInfoBuilder::default()
    }

    /// Pixel format.
    pub fn format(&self) -> PixelFormat { self.format }
    /// Bits per pixel.
    pub fn bits_per_pixel(&self) -> u32 { self.format.bits_per_pixel }
    /// Bits per channel.
    pub fn bits_per_channel(&self) -> u32 { self.format.bits_per_channel }
    /// Float pixel format.
    pub fn is_float(&self) -> bool { self.format.is_float }
    /// Image size as (width, height).
    pub fn size(&self) -> (u32, u32) { (self.width, self.height) }
    /// Width in pixels.
    pub fn width(&self) -> u32 { self.width }
    /// Height in pixels.
    pub fn height(&self) -> u32 { self.height }
    /// Number of embedded color profiles.
    pub fn profile_count(&self) -> u32 { self.profile_count }
    /// Classified kind.
    pub fn kind(&self) -> AdvancedColorKind { self.kind }
    /// BT.2100 override present.
    pub fn forced_bt2100(&self) -> bool { self.forced_bt2100 }
    /// Gain map present.
    pub fn has_gain_map(&self) -> bool { self.has_gain_map }
    /// Gain map size, (0, 0) without one.
    pub fn gain_map_size(&self) -> (u32, u32) { self.gain_map_size }
    /// Load succeeded.
    pub fn is_valid(&self) -> bool { self.is_valid }

    /// HDR values are scene referred unless they were recovered from a
    /// gain map.
    pub fn is_scene_referred(&self) -> bool {
        !self.has_gain_map
    }
}

/// Field-by-field construction of an [`ImageInfo`].
#[derive(Debug, Clone, Default)]
pub struct ImageInfoBuilder {
    info: ImageInfo,
}

impl ImageInfoBuilder {
    /// Sets the pixel format.
    pub fn format(mut self, format: PixelFormat) -> Self {
        self.info.format = format;
        self
    }

    /// Sets the pixel size.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.info.width = width;
        self.info.height = height;
        self
    }

    /// Sets the embedded profile count.
    pub fn profile_count(mut self, count: u32) -> Self {
        self.info.profile_count = count;
        self
    }

    /// Sets the BT.2100 override.
    pub fn forced_bt2100(mut self, forced: bool) -> Self {
        self.info.forced_bt2100 = forced;
        self
    }

    /// Records a gain map of the given size.
    pub fn gain_map(mut self, width: u32, height: u32) -> Self {
        self.info.has_gain_map = true;
        self.info.gain_map_size = (width, height);
        self
    }

    /// Validates, classifies and freezes the info.
    pub fn build(self) -> Result<ImageInfo> {
        let mut info = self.info;
        if !info.format.is_supported() {
            return Err(Error::invalid_image(format!(
                "unsupported pixel format ({} bpp, {} bpc)",
                info.format.bits_per_pixel, info.format.bits_per_channel
            )));
        }
        if info.width == 0 || info.height == 0 {
            return Err(Error::InvalidDimensions { width: info.width, height: info.height });
        }
        if info.has_gain_map && (info.gain_map_size.0 == 0 || info.gain_map_size.1 == 0) {
            return Err(Error::invalid_image("empty gain map"));
        }

        info.kind = classify(&ClassifierInput {
            bits_per_channel: info.format.bits_per_channel,
            is_float: info.format.is_float,
            profile_count: info.profile_count,
            forced_bt2100: info.forced_bt2100,
            has_gain_map: info.has_gain_map,
        });
        info.is_valid = true;
        Ok(info)
    }
}

/// Outcome of loading an image.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    /// Image can be displayed.
    Valid(ImageInfo),
    /// Image was rejected.
    Invalid(String),
}

impl LoadResult {
    /// Validates and classifies a decoded image.
    pub fn inspect(image: &DecodedImage) -> Self {
        match inspect(image) {
            Ok(info) => Self::Valid(info),
            Err(e) => Self::Invalid(e.to_string()),
        }
    }

    /// True for [`LoadResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The info, or an invalid placeholder.
    pub fn info(&self) -> ImageInfo {
        match self {
            Self::Valid(info) => *info,
            Self::Invalid(_) => ImageInfo::invalid(),
        }
    }

    /// Rejection reason.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

fn inspect(image: &DecodedImage) -> Result<ImageInfo> {
    let expected = image.pixel_count() * 4;
    if image.pixels.len() != expected {
        return Err(Error::invalid_image(format!(
            "pixel buffer holds {} values, expected {expected}",
            image.pixels.len()
        )));
    }

    let mut builder = ImageInfo::builder()
        .format(image.format)
        .size(image.width, image.height)
        .profile_count(image.profile_count)
        .forced_bt2100(image.force_bt2100);

    if let Some(gain_map) = &image.gain_map {
        let expected = gain_map.width as usize * gain_map.height as usize;
        if gain_map.data.len() != expected {
            return Err(Error::invalid_image(format!(
                "gain map holds {} values, expected {expected}",
                gain_map.data.len()
            )));
        }
        builder = builder.gain_map(gain_map.width, gain_map.height);
    }

    builder.build()
}
