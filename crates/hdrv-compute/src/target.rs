//! FP16 swap-chain stand-in.

use crate::image::ComputeImage;
use half::f16;

/// Half float RGBA render target, cleared to opaque black on every present.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    data: Vec<f16>,
}

impl RenderTarget {
    /// Allocates a cleared target.
    pub fn new(width: u32, height: u32) -> Self {
        let mut target = Self { width, height, data: Vec::new() };
        target.clear();
        target
    }

    /// Size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fills with opaque black.
    pub fn clear(&mut self) {
        let px = [f16::ZERO, f16::ZERO, f16::ZERO, f16::ONE];
        self.data = px.repeat(self.width as usize * self.height as usize);
    }

    /// Draws `image` with its top-left corner at `offset`, clipped to the
    /// target. Values are rounded to half precision.
    pub fn blit(&mut self, image: &ComputeImage, offset: (f32, f32)) {
        let ox = offset.0.round() as i64;
        let oy = offset.1.round() as i64;
        for y in 0..image.height as i64 {
            let ty = y + oy;
            if ty < 0 || ty >= self.height as i64 {
                continue;
            }
            for x in 0..image.width as i64 {
                let tx = x + ox;
                if tx < 0 || tx >= self.width as i64 {
                    continue;
                }
                let px = image.pixel(x as u32, y as u32);
                let i = (ty as usize * self.width as usize + tx as usize) * 4;
                for (dst, v) in self.data[i..i + 4].iter_mut().zip(px) {
                    *dst = f16::from_f32(v);
                }
            }
        }
    }

    /// Converts the target back to f32.
    pub fn read(&self) -> ComputeImage {
        let data = self.data.iter().map(|v| v.to_f32()).collect();
        ComputeImage { data, width: self.width, height: self.height, edge: Default::default() }
    }
}
