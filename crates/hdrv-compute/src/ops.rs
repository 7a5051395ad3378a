//! CPU implementations of every [`Kernel`](crate::Kernel).
//!
//! All per-pixel kernels run over RGBA chunks with rayon. Working values are
//! scRGB, so luminance in nits is `luma * 80`.

use crate::image::{ComputeImage, EdgeMode};
use glam::{Vec2, Vec3};
use hdrv_core::{luminance_rec709, NOMINAL_WHITE_NITS};
use hdrv_transfer::Transfer;
use rayon::prelude::*;
use std::f32::consts::{PI, TAU};

const C: usize = ComputeImage::CHANNELS;

/// Applies `f` to every pixel in place.
fn map_pixels<F>(image: &mut ComputeImage, f: F)
where
    F: Fn(&mut [f32]) + Sync + Send,
{
    image.data.par_chunks_mut(C).for_each(f);
}

#[inline]
fn luma(px: &[f32]) -> f32 {
    luminance_rec709([px[0], px[1], px[2]])
}

#[inline]
fn apply_matrix(px: &mut [f32], m: &[f32; 16]) {
    let (r, g, b, a) = (px[0], px[1], px[2], px[3]);
    px[0] = m[0] * r + m[1] * g + m[2] * b + m[3] * a;
    px[1] = m[4] * r + m[5] * g + m[6] * b + m[7] * a;
    px[2] = m[8] * r + m[9] * g + m[10] * b + m[11] * a;
    px[3] = m[12] * r + m[13] * g + m[14] * b + m[15] * a;
}

/// Decode curve then primaries matrix.
pub fn color_management(image: &mut ComputeImage, transfer: Transfer, matrix: &[f32; 16]) {
    map_pixels(image, |px| {
        for v in px.iter_mut().take(3) {
            *v = transfer.decode(*v);
        }
        apply_matrix(px, matrix);
    });
}

/// RGBA matrix, optionally clamping negative output.
pub fn color_matrix(image: &mut ComputeImage, matrix: &[f32; 16], clamp_output: bool) {
    map_pixels(image, |px| {
        apply_matrix(px, matrix);
        if clamp_output {
            px.iter_mut().for_each(|v| *v = v.max(0.0));
        }
    });
}

/// Multiplies the base by a linearized, resampled gain map.
pub fn gain_map_merge(base: &mut ComputeImage, gain_map: &ComputeImage, gamma: f32, white_scale: f32, gain: f32) {
    let (w, h) = base.size();
    let sx = gain_map.width as f32 / w.max(1) as f32;
    let sy = gain_map.height as f32 / h.max(1) as f32;
    base.data
        .par_chunks_mut(w as usize * C)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_mut(C).enumerate() {
                let g = gain_map.sample((x as f32 + 0.5) * sx, (y as f32 + 0.5) * sy)[0];
                let g = g.max(0.0).powf(gamma) * white_scale;
                for v in px.iter_mut().take(3) {
                    *v *= gain * g;
                }
            }
        });
}

/// Extended Reinhard on luminance, mapping `input_max` nits onto
/// `output_max` nits. Identity when the content already fits.
pub fn hdr_tonemap(image: &mut ComputeImage, input_max: f32, output_max: f32) {
    if input_max <= output_max || output_max <= 0.0 {
        return;
    }
    let w = input_max / output_max;
    map_pixels(image, |px| {
        let nits = luma(px) * NOMINAL_WHITE_NITS;
        if nits <= 0.0 {
            return;
        }
        let scale = reinhard(nits / output_max, w) * output_max / nits;
        px.iter_mut().take(3).for_each(|v| *v *= scale);
    });
}

/// Extended Reinhard on `x` relative to the output peak, white point `w`.
/// Saturates at 1.0.
#[inline]
fn reinhard(x: f32, w: f32) -> f32 {
    (x * (1.0 + x / (w * w)) / (1.0 + x)).min(1.0)
}

/// The same curve applied to each channel, for devices without a luminance
/// tonemapper. Hue can shift on saturated highlights.
pub fn simple_tonemap(image: &mut ComputeImage, input_max: f32, output_max: f32) {
    if output_max <= 0.0 {
        return;
    }
    let peak = output_max / NOMINAL_WHITE_NITS;
    if input_max <= output_max {
        map_pixels(image, |px| px.iter_mut().take(3).for_each(|v| *v = v.min(peak)));
        return;
    }
    let w = input_max / output_max;
    map_pixels(image, |px| {
        for v in px.iter_mut().take(3) {
            if *v > 0.0 {
                *v = reinhard(*v / peak, w) * peak;
            }
        }
    });
}

/// Linear gain.
pub fn white_level_adjust(image: &mut ComputeImage, input_nits: f32, output_nits: f32) {
    if input_nits <= 0.0 {
        return;
    }
    let scale = output_nits / input_nits;
    map_pixels(image, |px| px.iter_mut().take(3).for_each(|v| *v *= scale));
}

/// SDR-range pixels (luminance up to scRGB 1.0) turn grey.
pub fn sdr_overlay(image: &mut ComputeImage) {
    map_pixels(image, |px| {
        let y = luma(px);
        if y <= 1.0 {
            let y = y.max(0.0);
            px[0] = y;
            px[1] = y;
            px[2] = y;
        }
    });
}

/// Color for a luminance band of the heatmap.
pub fn heatmap_color(nits: f32) -> [f32; 3] {
    match nits {
        n if n < 0.05 => [0.0, 0.0, 0.0],
        n if n <= 80.0 => {
            let g = n / NOMINAL_WHITE_NITS;
            [g, g, g]
        }
        n if n <= 200.0 => [0.0, 1.0, 1.0],
        n if n <= 400.0 => [0.0, 1.0, 0.0],
        n if n <= 1000.0 => [1.0, 1.0, 0.0],
        n if n <= 4000.0 => [1.0, 0.5, 0.0],
        n if n <= 10000.0 => [1.0, 0.0, 0.0],
        _ => [1.0, 0.0, 1.0],
    }
}

/// False color luminance bands.
pub fn luminance_heatmap(image: &mut ComputeImage) {
    map_pixels(image, |px| {
        let c = heatmap_color(luma(px) * NOMINAL_WHITE_NITS);
        px[..3].copy_from_slice(&c);
    });
}

/// Pixels above `nits` turn solid red.
pub fn max_luminance(image: &mut ComputeImage, nits: f32) {
    map_pixels(image, |px| {
        if luma(px) * NOMINAL_WHITE_NITS > nits {
            px[..3].copy_from_slice(&[1.0, 0.0, 0.0]);
        }
    });
}

/// Projects an equirectangular panorama onto a sphere seen from outside.
///
/// `center` is the normalized longitude/latitude offset, `zoom` the sphere
/// radius relative to the smaller output dimension.
pub fn sphere_map(src: &ComputeImage, center: [f32; 2], scene_size: [f32; 2], zoom: f32) -> ComputeImage {
    let w = scene_size[0].max(1.0).round() as u32;
    let h = scene_size[1].max(1.0).round() as u32;
    let mut out = ComputeImage::new(w, h);
    let half = Vec2::new(w as f32, h as f32) * 0.5;
    let radius = (w.min(h) as f32 * zoom).max(1.0);
    let (sw, sh) = (src.width as f32, src.height as f32);

    out.data
        .par_chunks_mut(w as usize * C)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_mut(C).enumerate() {
                let p = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - half) / radius;
                let d2 = p.length_squared();
                if d2 > 1.0 {
                    px.copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
                    continue;
                }
                let n = Vec3::new(p.x, p.y, (1.0 - d2).sqrt());
                let lon = n.x.atan2(n.z) + center[0] * TAU;
                let lat = n.y.clamp(-1.0, 1.0).asin() + (center[1] - 0.5) * PI;
                let u = lon / TAU + 0.5;
                let v = lat / PI + 0.5;
                px.copy_from_slice(&src.sample(u * sw, v * sh));
            }
        });
    out
}

/// Resamples by `factor`: box average when shrinking, nearest when growing.
pub fn scale(src: &ComputeImage, factor: f32) -> ComputeImage {
    if factor == 1.0 || src.is_empty() {
        return src.clone();
    }
    let w = ((src.width as f32 * factor).round() as u32).max(1);
    let h = ((src.height as f32 * factor).round() as u32).max(1);
    let fx = src.width as f32 / w as f32;
    let fy = src.height as f32 / h as f32;
    let mut out = ComputeImage::new(w, h);
    out.edge = src.edge;

    out.data
        .par_chunks_mut(w as usize * C)
        .enumerate()
        .for_each(|(oy, row)| {
            let y0 = ((oy as f32 * fy) as u32).min(src.height - 1);
            let y1 = (((oy + 1) as f32 * fy) as u32).clamp(y0 + 1, src.height);
            for (ox, px) in row.chunks_mut(C).enumerate() {
                let x0 = ((ox as f32 * fx) as u32).min(src.width - 1);
                let x1 = (((ox + 1) as f32 * fx) as u32).clamp(x0 + 1, src.width);
                let mut sum = [0.0f32; 4];
                for sy in y0..y1 {
                    for sx in x0..x1 {
                        let p = src.pixel(sx, sy);
                        sum.iter_mut().zip(p).for_each(|(s, v)| *s += v);
                    }
                }
                let n = ((y1 - y0) * (x1 - x0)) as f32;
                for (o, s) in px.iter_mut().zip(sum) {
                    *o = s / n;
                }
            }
        });
    out
}

/// Per-channel power of non-negative values.
pub fn gamma_transfer(image: &mut ComputeImage, exponents: &[Option<f32>; 4]) {
    map_pixels(image, |px| {
        for (v, e) in px.iter_mut().zip(exponents) {
            if let Some(e) = e {
                *v = v.max(0.0).powf(*e);
            }
        }
    });
}

/// Normalized histogram of the red channel over [0, 1].
///
/// Values outside the range land in the first or last bin. An empty image
/// yields all-zero bins.
pub fn histogram(image: &ComputeImage, bins: usize) -> Vec<f32> {
    if bins == 0 {
        return Vec::new();
    }
    let counts = image
        .data
        .par_chunks(C)
        .fold(
            || vec![0u64; bins],
            |mut acc, px| {
                let v = if px[0].is_nan() { 0.0 } else { px[0].clamp(0.0, 1.0) };
                let idx = ((v * bins as f32) as usize).min(bins - 1);
                acc[idx] += 1;
                acc
            },
        )
        .reduce(
            || vec![0u64; bins],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                a
            },
        );

    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0.0; bins];
    }
    counts.into_iter().map(|c| c as f32 / total as f32).collect()
}

/// Returns a copy sampled with wrap-around.
pub fn border_wrap(src: &ComputeImage) -> ComputeImage {
    let mut out = src.clone();
    out.edge = EdgeMode::Wrap;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::diagonal_rgba;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_matrix_clamp() {
        let mut img = ComputeImage::solid(1, 1, [0.5, 0.5, 0.5, 1.0]);
        color_matrix(&mut img, &diagonal_rgba(-1.0), true);
        assert_eq!(img.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_color_management_srgb() {
        let mut img = ComputeImage::solid(1, 1, [1.0, 0.5, 0.0, 1.0]);
        color_management(&mut img, Transfer::Srgb, &diagonal_rgba(1.0));
        let px = img.pixel(0, 0);
        assert_relative_eq!(px[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(px[1], 0.214, epsilon = 1e-3);
        assert_eq!(px[3], 1.0);
    }

    #[test]
    fn test_gain_map_merge() {
        let mut base = ComputeImage::solid(4, 4, [0.5, 0.25, 1.0, 1.0]);
        let gain = ComputeImage::from_luma(&[1.0; 4], 2, 2).unwrap();
        gain_map_merge(&mut base, &gain, 1.0 / 2.2, 0.5, 2.0);
        // 2 * base * (1^(1/2.2) * 0.5)
        assert_eq!(base.pixel(3, 3), [0.5, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn test_hdr_tonemap_maps_peak() {
        // 1000 nits grey onto a 500 nit display
        let mut img = ComputeImage::solid(1, 1, [12.5, 12.5, 12.5, 1.0]);
        hdr_tonemap(&mut img, 1000.0, 500.0);
        assert_relative_eq!(img.pixel(0, 0)[0] * 80.0, 500.0, max_relative = 1e-4);

        let mut fits = ComputeImage::solid(1, 1, [2.0, 2.0, 2.0, 1.0]);
        hdr_tonemap(&mut fits, 400.0, 600.0);
        assert_eq!(fits.pixel(0, 0)[0], 2.0);
    }

    #[test]
    fn test_simple_tonemap_per_channel() {
        // 1000 nits red, 100 nits green onto 500 nits
        let mut img = ComputeImage::solid(1, 1, [12.5, 1.25, 0.0, 1.0]);
        simple_tonemap(&mut img, 1000.0, 500.0);
        let px = img.pixel(0, 0);
        assert_relative_eq!(px[0] * 80.0, 500.0, max_relative = 1e-4);
        assert!(px[1] * 80.0 < 100.0 && px[1] * 80.0 > 80.0, "{px:?}");
        assert_eq!(px[2], 0.0);
        assert_eq!(px[3], 1.0);

        // input already fits: only values above the peak are limited
        let mut fits = ComputeImage::solid(1, 1, [2.0, 8.0, 0.5, 1.0]);
        simple_tonemap(&mut fits, 400.0, 400.0);
        assert_eq!(fits.pixel(0, 0), [2.0, 5.0, 0.5, 1.0]);
    }

    #[test]
    fn test_sdr_overlay() {
        let mut img = ComputeImage::from_rgba(vec![1.0, 0.0, 0.0, 1.0, 4.0, 2.0, 2.0, 1.0], 2, 1).unwrap();
        sdr_overlay(&mut img);
        assert_relative_eq!(img.pixel(0, 0)[1], 0.2126, epsilon = 1e-6);
        assert_eq!(img.pixel(1, 0), [4.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_heatmap_bands() {
        assert_eq!(heatmap_color(0.0), [0.0, 0.0, 0.0]);
        assert_eq!(heatmap_color(40.0), [0.5, 0.5, 0.5]);
        assert_eq!(heatmap_color(150.0), [0.0, 1.0, 1.0]);
        assert_eq!(heatmap_color(600.0), [1.0, 1.0, 0.0]);
        assert_eq!(heatmap_color(20000.0), [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_max_luminance() {
        let mut img = ComputeImage::from_rgba(vec![10.0, 10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0], 2, 1).unwrap();
        max_luminance(&mut img, 400.0);
        assert_eq!(img.pixel(0, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.pixel(1, 0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_scale_box_average() {
        let img = ComputeImage::from_rgba(
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            2,
            2,
        )
        .unwrap();
        let small = scale(&img, 0.5);
        assert_eq!(small.size(), (1, 1));
        assert_eq!(small.pixel(0, 0), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_gamma_transfer_red_only() {
        let mut img = ComputeImage::solid(1, 1, [0.25, 0.25, 0.25, 1.0]);
        gamma_transfer(&mut img, &[Some(0.5), None, None, None]);
        assert_eq!(img.pixel(0, 0), [0.5, 0.25, 0.25, 1.0]);
    }

    #[test]
    fn test_histogram_normalized() {
        let img = ComputeImage::from_rgba(
            vec![0.0, 0.0, 0.0, 1.0, 0.999, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 1.0, 0.5, 0.0, 0.0, 1.0],
            4,
            1,
        )
        .unwrap();
        let h = histogram(&img, 4);
        assert_eq!(h, vec![0.25, 0.0, 0.25, 0.5]);
        assert_eq!(histogram(&ComputeImage::new(0, 0), 4), vec![0.0; 4]);
    }

    #[test]
    fn test_sphere_map_size_and_outside() {
        let src = border_wrap(&ComputeImage::solid(8, 4, [0.5, 0.5, 0.5, 1.0]));
        let out = sphere_map(&src, [0.0, 0.5], [10.0, 10.0], 0.25);
        assert_eq!(out.size(), (10, 10));
        // corner lies outside the sphere
        assert_eq!(out.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
        let c = out.pixel(5, 5);
        assert_relative_eq!(c[0], 0.5, epsilon = 1e-5);
    }
}
