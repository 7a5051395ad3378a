//! CPU device: reference implementation of every kernel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{DeviceCaps, EffectHandle, GpuDevice, ImageHandle};
use crate::image::ComputeImage;
use crate::kernel::{Kernel, KernelKind};
use crate::ops;
use crate::target::RenderTarget;
use crate::{ComputeError, ComputeResult};

/// Cloneable handle that marks a device as removed, from any thread.
#[derive(Debug, Clone, Default)]
pub struct DeviceLossSignal(Arc<AtomicBool>);

impl DeviceLossSignal {
    /// Marks the device as removed.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True while the device is removed.
    pub fn is_lost(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Image owned by a [`CpuDevice`] generation.
#[derive(Debug, Clone)]
pub struct CpuImage {
    generation: u64,
    image: ComputeImage,
}

impl ImageHandle for CpuImage {
    fn size(&self) -> (u32, u32) {
        self.image.size()
    }
}

/// Effect object owned by a [`CpuDevice`] generation.
#[derive(Debug, Clone, Copy)]
pub struct CpuEffect {
    generation: u64,
    kind: KernelKind,
}

impl EffectHandle for CpuEffect {
    fn kind(&self) -> KernelKind {
        self.kind
    }
}

/// Rayon-backed device with an FP16 render target.
#[derive(Debug)]
pub struct CpuDevice {
    caps: DeviceCaps,
    generation: u64,
    loss: DeviceLossSignal,
    target: RenderTarget,
    pending_fault: Option<u32>,
    frames: u64,
}

impl CpuDevice {
    /// Device with every capability.
    pub fn new() -> Self {
        Self::with_caps(DeviceCaps::default())
    }

    /// Device with the given capabilities.
    pub fn with_caps(caps: DeviceCaps) -> Self {
        Self {
            caps,
            generation: 0,
            loss: DeviceLossSignal::default(),
            target: RenderTarget::new(0, 0),
            pending_fault: None,
            frames: 0,
        }
    }

    /// Signal that removes this device when triggered.
    pub fn loss_signal(&self) -> DeviceLossSignal {
        self.loss.clone()
    }

    /// Makes the next object creation fail with a fatal `status`.
    pub fn inject_fault(&mut self, status: u32) {
        self.pending_fault = Some(status);
    }

    /// Number of recoveries so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frames presented since creation.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    fn take_fault(&mut self, context: &str) -> ComputeResult<()> {
        match self.pending_fault.take() {
            Some(status) => Err(ComputeError::Fatal { status, context: context.to_string() }),
            None => Ok(()),
        }
    }

    fn owned(&self, generation: u64) -> ComputeResult<()> {
        if generation != self.generation {
            return Err(ComputeError::StaleHandle { expected: self.generation, found: generation });
        }
        Ok(())
    }

    fn wrap(&self, image: ComputeImage) -> CpuImage {
        CpuImage { generation: self.generation, image }
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn in_place(src: &ComputeImage, f: impl FnOnce(&mut ComputeImage)) -> ComputeImage {
    let mut out = src.clone();
    f(&mut out);
    out
}

impl GpuDevice for CpuDevice {
    type Image = CpuImage;
    type Effect = CpuEffect;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn caps(&self) -> DeviceCaps {
        self.caps
    }

    fn check(&self) -> ComputeResult<()> {
        if self.loss.is_lost() {
            return Err(ComputeError::DeviceRemoved);
        }
        Ok(())
    }

    fn recover(&mut self) -> ComputeResult<()> {
        self.loss.reset();
        self.generation += 1;
        let (w, h) = self.target.size();
        self.target = RenderTarget::new(w, h);
        debug!(generation = self.generation, "cpu device recreated");
        Ok(())
    }

    fn upload(&mut self, image: &ComputeImage) -> ComputeResult<CpuImage> {
        self.check()?;
        self.take_fault("upload")?;
        Ok(self.wrap(image.clone()))
    }

    fn create_effect(&mut self, kind: KernelKind) -> ComputeResult<CpuEffect> {
        self.check()?;
        self.take_fault("create effect")?;
        let supported = match kind {
            KernelKind::HdrTonemap => self.caps.hdr_tonemap,
            KernelKind::Histogram => self.caps.histogram,
            _ => true,
        };
        if !supported {
            warn!(%kind, "effect unsupported on cpu device");
            return Err(ComputeError::Unsupported(kind.to_string()));
        }
        Ok(CpuEffect { generation: self.generation, kind })
    }

    fn apply(&mut self, effect: &CpuEffect, kernel: &Kernel, inputs: &[&CpuImage]) -> ComputeResult<CpuImage> {
        self.check()?;
        self.owned(effect.generation)?;
        if effect.kind != kernel.kind() {
            return Err(ComputeError::InvalidInput(format!(
                "{} effect cannot run {} kernel",
                effect.kind,
                kernel.kind()
            )));
        }
        if inputs.len() != kernel.input_count() {
            return Err(ComputeError::InvalidInput(format!(
                "{} expects {} inputs, got {}",
                kernel.kind(),
                kernel.input_count(),
                inputs.len()
            )));
        }
        for input in inputs {
            self.owned(input.generation)?;
        }
        trace!(kernel = %kernel.kind(), "apply");

        let src = &inputs[0].image;
        let out = match kernel {
            Kernel::ColorManagement { transfer, matrix } => {
                in_place(src, |img| ops::color_management(img, *transfer, matrix))
            }
            Kernel::GainMapMerge { gamma, white_scale, gain } => {
                let gain_map = &inputs[1].image;
                in_place(src, |img| ops::gain_map_merge(img, gain_map, *gamma, *white_scale, *gain))
            }
            Kernel::ColorMatrix { matrix, clamp_output } => {
                in_place(src, |img| ops::color_matrix(img, matrix, *clamp_output))
            }
            Kernel::HdrTonemap { input_max_nits, output_max_nits } => {
                in_place(src, |img| ops::hdr_tonemap(img, *input_max_nits, *output_max_nits))
            }
            Kernel::SimpleTonemap { input_max_nits, output_max_nits } => {
                in_place(src, |img| ops::simple_tonemap(img, *input_max_nits, *output_max_nits))
            }
            Kernel::WhiteLevelAdjust { input_nits, output_nits } => {
                in_place(src, |img| ops::white_level_adjust(img, *input_nits, *output_nits))
            }
            Kernel::SdrOverlay => in_place(src, ops::sdr_overlay),
            Kernel::LuminanceHeatmap => in_place(src, ops::luminance_heatmap),
            Kernel::MaxLuminance { nits } => in_place(src, |img| ops::max_luminance(img, *nits)),
            Kernel::BorderWrap => ops::border_wrap(src),
            Kernel::SphereMap { center, scene_size, zoom } => {
                ops::sphere_map(src, *center, *scene_size, *zoom)
            }
            Kernel::Scale { factor } => ops::scale(src, *factor),
            Kernel::GammaTransfer { exponents } => {
                in_place(src, |img| ops::gamma_transfer(img, exponents))
            }
        };
        Ok(self.wrap(out))
    }

    fn histogram(&mut self, effect: &CpuEffect, input: &CpuImage, bins: usize) -> ComputeResult<Vec<f32>> {
        self.check()?;
        self.owned(effect.generation)?;
        self.owned(input.generation)?;
        if effect.kind != KernelKind::Histogram {
            return Err(ComputeError::InvalidInput(format!("{} effect cannot reduce", effect.kind)));
        }
        Ok(ops::histogram(&input.image, bins))
    }

    fn download(&mut self, image: &CpuImage) -> ComputeResult<ComputeImage> {
        self.check()?;
        self.owned(image.generation)?;
        Ok(image.image.clone())
    }

    fn resize_target(&mut self, width: u32, height: u32) -> ComputeResult<()> {
        self.check()?;
        self.target = RenderTarget::new(width, height);
        Ok(())
    }

    fn present(&mut self, image: Option<&CpuImage>, offset: (f32, f32)) -> ComputeResult<()> {
        self.check()?;
        self.target.clear();
        if let Some(image) = image {
            self.owned(image.generation)?;
            self.target.blit(&image.image, offset);
        }
        self.frames += 1;
        Ok(())
    }

    fn read_target(&mut self) -> ComputeResult<ComputeImage> {
        self.check()?;
        Ok(self.target.read())
    }
}
