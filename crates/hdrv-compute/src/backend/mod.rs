//! Device abstraction.

pub mod cpu_backend;

use crate::image::ComputeImage;
use crate::kernel::{Kernel, KernelKind};
use crate::ComputeResult;

/// Optional device features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    /// Device ships a luminance tonemapper ([`KernelKind::HdrTonemap`]).
    pub hdr_tonemap: bool,
    /// Device can run data-reduction kernels ([`KernelKind::Histogram`]).
    pub histogram: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self { hdr_tonemap: true, histogram: true }
    }
}

/// Handle to an image in device memory.
pub trait ImageHandle {
    /// Size as (width, height).
    fn size(&self) -> (u32, u32);
}

/// Handle to a device effect object.
pub trait EffectHandle {
    /// Kernel kind this effect runs.
    fn kind(&self) -> KernelKind;
}

/// A device that runs the viewer's stages.
///
/// All calls fail with a device-lost error once the device is removed, until
/// [`GpuDevice::recover`] is called. Handles do not survive recovery.
pub trait GpuDevice {
    /// Backend image handle.
    type Image: ImageHandle;
    /// Backend effect handle.
    type Effect: EffectHandle;

    /// Backend name.
    fn name(&self) -> &'static str;

    /// Optional features.
    fn caps(&self) -> DeviceCaps;

    /// Errors if the device has been lost.
    fn check(&self) -> ComputeResult<()>;

    /// Recreates the device. Invalidates all existing handles.
    fn recover(&mut self) -> ComputeResult<()>;

    /// Uploads an image.
    fn upload(&mut self, image: &ComputeImage) -> ComputeResult<Self::Image>;

    /// Creates an effect object.
    fn create_effect(&mut self, kind: KernelKind) -> ComputeResult<Self::Effect>;

    /// Runs `kernel` on `inputs` using a matching effect.
    fn apply(&mut self, effect: &Self::Effect, kernel: &Kernel, inputs: &[&Self::Image]) -> ComputeResult<Self::Image>;

    /// Normalized histogram of the red channel. Blocks until read back.
    fn histogram(&mut self, effect: &Self::Effect, input: &Self::Image, bins: usize) -> ComputeResult<Vec<f32>>;

    /// Reads an image back.
    fn download(&mut self, image: &Self::Image) -> ComputeResult<ComputeImage>;

    /// Resizes the render target.
    fn resize_target(&mut self, width: u32, height: u32) -> ComputeResult<()>;

    /// Clears the target and draws `image` at `offset`, then finishes the frame.
    fn present(&mut self, image: Option<&Self::Image>, offset: (f32, f32)) -> ComputeResult<()>;

    /// Reads the render target back.
    fn read_target(&mut self) -> ComputeResult<ComputeImage>;
}
