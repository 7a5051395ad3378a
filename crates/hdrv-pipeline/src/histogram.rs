//! Content light level estimation from a luminance histogram.
//!
//! The analysis image is downscaled, reduced to BT.709 luminance in the red
//! channel, normalized so `max_nits` lands on 1.0 and gamma encoded to spend
//! resolution on darker values. The normalized histogram is then walked from
//! the top:
//!
//! - max: the last bin reached while the running sum is still below
//!   `1 - max_percentile`
//! - median: the first bin where the running sum exceeds
//!   `1 - median_percentile`

use crate::config::HistogramConfig;
use hdrv_compute::{ComputeError, ComputeResult, GpuDevice, ImageHandle, Kernel, KernelKind};
use hdrv_core::{ImageCLL, NOMINAL_WHITE_NITS, REC709_LUMA};
use tracing::{debug, warn};

/// Percentile based CLL estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAnalyzer {
    config: HistogramConfig,
}

impl HistogramAnalyzer {
    /// Creates an analyzer.
    pub fn new(config: HistogramConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Downscale factor bounding the longer side by `max_dimension`.
    pub fn prescale(&self, size: (u32, u32)) -> f32 {
        let longest = size.0.max(size.1).max(1) as f32;
        self.config.max_prescale.min(self.config.max_dimension as f32 / longest)
    }

    /// Matrix writing normalized luminance into red, G/B/A pass through.
    pub fn luma_kernel(&self) -> Kernel {
        let s = self.config.max_nits / NOMINAL_WHITE_NITS;
        let [r, g, b] = REC709_LUMA;
        #[rustfmt::skip]
        let matrix = [
            r / s, g / s, b / s, 0.0,
            0.0,   1.0,   0.0,   0.0,
            0.0,   0.0,   1.0,   0.0,
            0.0,   0.0,   0.0,   1.0,
        ];
        Kernel::ColorMatrix { matrix, clamp_output: false }
    }

    /// Gamma on the red channel only.
    pub fn gamma_kernel(&self) -> Kernel {
        Kernel::GammaTransfer { exponents: [Some(self.config.gamma), None, None, None] }
    }

    /// Luminance at the lower edge of a bin.
    pub fn bin_to_nits(&self, bin: usize) -> f32 {
        let norm = bin as f32 / self.config.bins as f32;
        norm.powf(1.0 / self.config.gamma) * self.config.max_nits
    }

    /// Derives CLL from a normalized histogram.
    ///
    /// Returns [`ImageCLL::UNKNOWN`] when the histogram carries no luminance:
    /// all zero (some drivers), all black, or only clipped values in a
    /// skipped top bin.
    pub fn analyze(&self, bins: &[f32], scene_referred: bool) -> ImageCLL {
        let n = bins.len();
        if n < 2 {
            return ImageCLL::UNKNOWN;
        }
        let top = if self.config.skip_top_bin { n - 1 } else { n };
        let lit: f32 = bins[1..top].iter().sum();
        if lit <= 0.0 {
            return ImageCLL::UNKNOWN;
        }

        let max_threshold = 1.0 - self.config.max_percentile;
        let median_threshold = 1.0 - self.config.median_percentile;
        let mut max_bin = n - 1;
        let mut median_bin = 0;
        let mut running = 0.0f32;
        for i in (0..top).rev() {
            running += bins[i];
            // note the opposite inequalities
            if running < max_threshold {
                max_bin = i;
            }
            if running > median_threshold {
                median_bin = i;
                break;
            }
        }

        let max_nits = self.bin_to_nits(max_bin);
        if max_nits == 0.0 {
            return ImageCLL::UNKNOWN;
        }
        ImageCLL::new(max_nits, self.bin_to_nits(median_bin), scene_referred)
    }

    /// Runs the analysis passes on the device and reads the histogram back.
    ///
    /// Blocks until the readback completes.
    pub fn measure<D: GpuDevice>(
        &self,
        device: &mut D,
        effects: &AnalysisEffects<D>,
        input: &D::Image,
        scene_referred: bool,
    ) -> ComputeResult<ImageCLL> {
        let factor = self.prescale(input.size());
        let small = device.apply(&effects.scale, &Kernel::Scale { factor }, &[input])?;
        let luma = device.apply(&effects.luma, &self.luma_kernel(), &[&small])?;
        let encoded = device.apply(&effects.gamma, &self.gamma_kernel(), &[&luma])?;
        let bins = device.histogram(&effects.histogram, &encoded, self.config.bins)?;

        let cll = self.analyze(&bins, scene_referred);
        debug!(
            factor,
            max_nits = cll.max_nits,
            median_nits = cll.median_nits,
            "histogram analyzed"
        );
        Ok(cll)
    }
}

impl Default for HistogramAnalyzer {
    fn default() -> Self {
        Self::new(HistogramConfig::default())
    }
}

/// Device effects of the analysis passes.
pub struct AnalysisEffects<D: GpuDevice> {
    scale: D::Effect,
    luma: D::Effect,
    gamma: D::Effect,
    histogram: D::Effect,
}

impl<D: GpuDevice> AnalysisEffects<D> {
    /// Creates the analysis effects, or `None` when the device cannot reduce
    /// images to a histogram.
    pub fn create(device: &mut D) -> ComputeResult<Option<Self>> {
        if !device.caps().histogram {
            warn!(device = device.name(), "histogram unsupported, HDR metadata unavailable");
            return Ok(None);
        }
        let histogram = match device.create_effect(KernelKind::Histogram) {
            Ok(effect) => effect,
            Err(ComputeError::Unsupported(what)) => {
                warn!(%what, "histogram unsupported, HDR metadata unavailable");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(Some(Self {
            scale: device.create_effect(KernelKind::Scale)?,
            luma: device.create_effect(KernelKind::ColorMatrix)?,
            gamma: device.create_effect(KernelKind::GammaTransfer)?,
            histogram,
        }))
    }
}

impl<D: GpuDevice> std::fmt::Debug for AnalysisEffects<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AnalysisEffects")
    }
}
