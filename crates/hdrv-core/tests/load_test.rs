//! Load-boundary classification of typical decoder outputs.

use hdrv_core::{AdvancedColorKind, DecodedImage, EmbeddedProfile, GainMap, LoadResult, PixelFormat};

fn profile() -> EmbeddedProfile {
    EmbeddedProfile {
        red: (0.68, 0.32),
        green: (0.265, 0.69),
        blue: (0.15, 0.06),
        white: (0.3127, 0.329),
        gamma: 2.2,
    }
}

#[test]
fn test_srgb_png_is_sdr() {
    let image = DecodedImage::solid(PixelFormat::RGBA8, 5, 5, [0.5, 0.5, 0.5, 1.0]);
    let info = LoadResult::inspect(&image).info();
    assert!(info.is_valid());
    assert_eq!(info.kind(), AdvancedColorKind::StandardDynamicRange);
}

#[test]
fn test_profiled_8bit_is_wcg() {
    let image = DecodedImage::solid(PixelFormat::RGBA8, 5, 5, [0.5; 4]).with_profile(profile());
    let info = LoadResult::inspect(&image).info();
    assert_eq!(info.profile_count(), 1);
    assert_eq!(info.kind(), AdvancedColorKind::WideColorGamut);
}

#[test]
fn test_deep_integer_with_profile_is_wcg() {
    let image = DecodedImage::solid(PixelFormat::RGBA16, 5, 5, [0.5; 4]).with_profile(profile());
    assert_eq!(LoadResult::inspect(&image).info().kind(), AdvancedColorKind::WideColorGamut);
}

#[test]
fn test_float_is_hdr() {
    let image = DecodedImage::solid(PixelFormat::RGBA16F, 5, 5, [2.0, 2.0, 2.0, 1.0]);
    assert_eq!(LoadResult::inspect(&image).info().kind(), AdvancedColorKind::HighDynamicRange);
}

#[test]
fn test_bt2100_override_is_hdr() {
    let image = DecodedImage::solid(PixelFormat::RGBA16, 5, 5, [0.5; 4]).with_bt2100(true);
    let info = LoadResult::inspect(&image).info();
    assert!(info.forced_bt2100());
    assert_eq!(info.kind(), AdvancedColorKind::HighDynamicRange);
}

#[test]
fn test_gain_map_jpeg_is_hdr() {
    let image = DecodedImage::solid(PixelFormat::RGBA8, 8, 8, [0.5; 4])
        .with_gain_map(GainMap::new(4, 4, vec![0.25; 16]));
    let info = LoadResult::inspect(&image).info();
    assert_eq!(info.kind(), AdvancedColorKind::HighDynamicRange);
    assert!(!info.is_scene_referred());
}

#[test]
fn test_unsupported_format_is_invalid() {
    let format = PixelFormat { bits_per_pixel: 0, bits_per_channel: 0, is_float: false };
    let image = DecodedImage::new(format, 2, 2, vec![0.0; 16]);
    let result = LoadResult::inspect(&image);
    assert!(!result.is_valid());
    assert!(result.reason().unwrap().contains("unsupported pixel format"));
}

#[test]
fn test_empty_image_is_invalid() {
    let image = DecodedImage::new(PixelFormat::RGBA8, 0, 4, Vec::new());
    let result = LoadResult::inspect(&image);
    assert!(!result.is_valid());
    assert_eq!(result.info().kind(), AdvancedColorKind::StandardDynamicRange);
}
