//! RGBA f32 image used by kernels and readback.

use crate::{ComputeError, ComputeResult};

/// How samplers treat coordinates outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Repeat the edge pixel.
    #[default]
    Clamp,
    /// Tile the image, removes the seam of 360 degree panoramas.
    Wrap,
}

/// Interleaved RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeImage {
    pub(crate) data: Vec<f32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Sampling behaviour at the borders.
    pub edge: EdgeMode,
}

impl ComputeImage {
    /// Channels per pixel.
    pub const CHANNELS: usize = 4;

    /// Creates an image from interleaved RGBA data.
    pub fn from_rgba(data: Vec<f32>, width: u32, height: u32) -> ComputeResult<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(ComputeError::BufferSizeMismatch { expected, actual: data.len() });
        }
        Ok(Self { data, width, height, edge: EdgeMode::Clamp })
    }

    /// Expands single channel data into an RGBA image with opaque alpha.
    pub fn from_luma(luma: &[f32], width: u32, height: u32) -> ComputeResult<Self> {
        let expected = width as usize * height as usize;
        if luma.len() != expected {
            return Err(ComputeError::BufferSizeMismatch { expected, actual: luma.len() });
        }
        let data = luma.iter().flat_map(|&v| [v, v, v, 1.0]).collect();
        Ok(Self { data, width, height, edge: EdgeMode::Clamp })
    }

    /// Transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0.0; width as usize * height as usize * Self::CHANNELS],
            width,
            height,
            edge: EdgeMode::Clamp,
        }
    }

    /// Image filled with one value.
    pub fn solid(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        Self {
            data: rgba.repeat(width as usize * height as usize),
            width,
            height,
            edge: EdgeMode::Clamp,
        }
    }

    /// Pixel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable pixel data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image, returning its data.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Size as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True for a zero-area image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Pixel at (x, y), `None` when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Writes a pixel. Panics when out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [f32; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        self.data[i..i + Self::CHANNELS].copy_from_slice(&rgba);
    }

    /// Bilinear sample at continuous pixel coordinates (pixel centers at
    /// `i + 0.5`), honouring [`EdgeMode`].
    pub fn sample(&self, x: f32, y: f32) -> [f32; 4] {
        if self.is_empty() {
            return [0.0; 4];
        }
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let p00 = self.texel(x0 as i64, y0 as i64);
        let p10 = self.texel(x0 as i64 + 1, y0 as i64);
        let p01 = self.texel(x0 as i64, y0 as i64 + 1);
        let p11 = self.texel(x0 as i64 + 1, y0 as i64 + 1);

        let mut out = [0.0; 4];
        for c in 0..Self::CHANNELS {
            let top = p00[c] + (p10[c] - p00[c]) * tx;
            let bottom = p01[c] + (p11[c] - p01[c]) * tx;
            out[c] = top + (bottom - top) * ty;
        }
        out
    }

    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match self.edge {
            EdgeMode::Clamp => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            EdgeMode::Wrap => (x.rem_euclid(w), y.rem_euclid(h)),
        };
        self.pixel(x as u32, y as u32)
    }
}
