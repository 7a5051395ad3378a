//! File decoding into [`DecodedImage`] and PNG export.

use crate::icc;
use anyhow::{Context, Result};
use hdrv_compute::ComputeImage;
use hdrv_core::{DecodedImage, GainMap, PixelFormat};
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

/// Decodes an image file. Integer formats keep their encoded values,
/// float formats (EXR, Radiance) are taken as linear scRGB.
pub fn load(path: &Path, force_bt2100: bool) -> Result<DecodedImage> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let mut decoder = reader
        .into_decoder()
        .with_context(|| format!("Unsupported image: {}", path.display()))?;
    let icc_bytes = decoder.icc_profile().unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "unreadable ICC profile");
        None
    });
    let image = DynamicImage::from_decoder(decoder).with_context(|| format!("Failed to decode: {}", path.display()))?;

    let format = pixel_format(image.color());
    let (width, height) = (image.width(), image.height());
    let mut decoded = DecodedImage::new(format, width, height, image.into_rgba32f().into_raw());
    if let Some(bytes) = icc_bytes {
        decoded.profile_count = 1;
        decoded.profile = icc::parse(&bytes);
        if decoded.profile.is_none() {
            warn!(path = %path.display(), len = bytes.len(), "ICC profile not interpreted");
        }
    }
    debug!(
        path = %path.display(),
        width,
        height,
        bpc = format.bits_per_channel,
        float = format.is_float,
        profile = decoded.profile.is_some(),
        "decoded"
    );
    Ok(decoded.with_bt2100(force_bt2100))
}

/// Decodes a gain map as single channel encoded values.
pub fn load_gain_map(path: &Path) -> Result<GainMap> {
    let image = image::open(path).with_context(|| format!("Failed to load gain map: {}", path.display()))?;
    let luma = image.to_luma32f();
    Ok(GainMap::new(luma.width(), luma.height(), luma.into_raw()))
}

/// Writes a linear scRGB frame as 8-bit sRGB PNG, clipping to SDR range.
pub fn save_png(path: &Path, frame: &ComputeImage) -> Result<()> {
    let (width, height) = frame.size();
    let bytes: Vec<u8> = frame
        .data()
        .chunks_exact(ComputeImage::CHANNELS)
        .flat_map(|px| {
            let c = |v: f32| to_u8(hdrv_transfer::srgb::oetf(v.clamp(0.0, 1.0)));
            [c(px[0]), c(px[1]), c(px[2]), to_u8(px[3].clamp(0.0, 1.0))]
        })
        .collect();
    let png = RgbaImage::from_raw(width, height, bytes).context("Frame buffer size mismatch")?;
    png.save(path).with_context(|| format!("Failed to save: {}", path.display()))
}

fn pixel_format(color: ColorType) -> PixelFormat {
    match color {
        ColorType::Rgb32F | ColorType::Rgba32F => PixelFormat::RGBA32F,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => PixelFormat::RGBA16,
        _ => PixelFormat::RGBA8,
    }
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hdrv_core::{AdvancedColorKind, LoadResult};
    use image::{ImageBuffer, Rgb, Rgba};

    #[test]
    fn test_load_png8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdr.png");
        RgbaImage::from_pixel(4, 3, Rgba([255, 128, 0, 255])).save(&path).unwrap();

        let image = load(&path, false).unwrap();
        assert_eq!(image.format, PixelFormat::RGBA8);
        assert_eq!(image.size(), (4, 3));
        assert_eq!(image.profile_count, 0);
        assert_abs_diff_eq!(image.pixels[1], 128.0 / 255.0, epsilon = 1e-6);
        assert_eq!(LoadResult::inspect(&image).info().kind(), AdvancedColorKind::StandardDynamicRange);
    }

    #[test]
    fn test_load_png16_is_wcg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.png");
        ImageBuffer::<Rgb<u16>, _>::from_pixel(2, 2, Rgb([65535u16, 0, 0])).save(&path).unwrap();

        let image = load(&path, false).unwrap();
        assert_eq!(image.format, PixelFormat::RGBA16);
        assert_eq!(LoadResult::inspect(&image).info().kind(), AdvancedColorKind::WideColorGamut);

        let forced = load(&path, true).unwrap();
        assert_eq!(LoadResult::inspect(&forced).info().kind(), AdvancedColorKind::HighDynamicRange);
    }

    #[test]
    fn test_load_radiance_is_hdr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bright.hdr");
        ImageBuffer::<Rgb<f32>, _>::from_pixel(2, 2, Rgb([4.0f32, 4.0, 4.0])).save(&path).unwrap();

        let image = load(&path, false).unwrap();
        assert!(image.format.is_float);
        assert_abs_diff_eq!(image.pixels[0], 4.0, epsilon = 1e-2);
        assert_eq!(LoadResult::inspect(&image).info().kind(), AdvancedColorKind::HighDynamicRange);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.png"), false).unwrap_err();
        assert!(err.to_string().contains("absent.png"));
    }

    #[test]
    fn test_gain_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gain.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([255])).save(&path).unwrap();

        let gain = load_gain_map(&path).unwrap();
        assert_eq!(gain.size(), (3, 2));
        assert!(gain.data.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_save_png_clips_and_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = ComputeImage::from_rgba(vec![4.0, 0.2140, -1.0, 1.0], 1, 1).unwrap();
        save_png(&path, &frame).unwrap();

        let px = image::open(&path).unwrap().into_rgba8().get_pixel(0, 0).0;
        assert_eq!(px[0], 255);
        assert!((px[1] as i32 - 128).abs() <= 1);
        assert_eq!(px[2], 0);
        assert_eq!(px[3], 255);
    }
}
