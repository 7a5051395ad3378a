//! # hdrv-compute
//!
//! Device abstraction for the viewer's image-processing stages.
//!
//! The pipeline talks to a [`GpuDevice`]: it uploads source images, creates
//! one effect handle per graph stage, runs [`Kernel`]s, presents the final
//! image onto an FP16 render target and reads data back. [`CpuDevice`] is the
//! reference implementation, with rayon-parallel kernels.
//!
//! # Device loss
//!
//! A device can be lost at any time, signalled through a
//! [`DeviceLossSignal`]. Every call after that fails with
//! [`ComputeError::DeviceRemoved`] until [`GpuDevice::recover`] runs, and
//! handles created before recovery are rejected with
//! [`ComputeError::StaleHandle`].
//!
//! ```rust
//! use hdrv_compute::{ComputeImage, CpuDevice, GpuDevice, Kernel};
//!
//! let mut device = CpuDevice::new();
//! let src = device.upload(&ComputeImage::solid(2, 2, [0.5, 0.5, 0.5, 1.0])).unwrap();
//! let effect = device.create_effect(Kernel::WhiteLevelAdjust { input_nits: 80.0, output_nits: 160.0 }.kind()).unwrap();
//! let out = device
//!     .apply(&effect, &Kernel::WhiteLevelAdjust { input_nits: 80.0, output_nits: 160.0 }, &[&src])
//!     .unwrap();
//! assert_eq!(device.download(&out).unwrap().pixel(0, 0), [1.0, 1.0, 1.0, 1.0]);
//! ```

pub mod backend;
pub mod image;
pub mod kernel;
pub mod ops;
pub mod target;

pub use backend::cpu_backend::{CpuDevice, CpuEffect, CpuImage, DeviceLossSignal};
pub use backend::{DeviceCaps, EffectHandle, GpuDevice, ImageHandle};
pub use image::{ComputeImage, EdgeMode};
pub use kernel::{Kernel, KernelKind};
pub use target::RenderTarget;

use thiserror::Error;

/// Numeric status codes carried by [`ComputeError`].
pub mod status {
    /// Adapter removed or driver crashed.
    pub const DEVICE_REMOVED: u32 = 0x887A_0005;
    /// Device reset by the driver.
    pub const DEVICE_RESET: u32 = 0x887A_0007;
    /// Handle belongs to a previous device generation.
    pub const STALE_HANDLE: u32 = 0x8007_0006;
    /// Feature not available on this device.
    pub const UNSUPPORTED: u32 = 0x8007_0032;
    /// Invalid argument.
    pub const INVALID_ARG: u32 = 0x8007_0057;
}

/// Device operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("device removed")]
    DeviceRemoved,

    #[error("device reset")]
    DeviceReset,

    #[error("stale handle: created on device generation {found}, current is {expected}")]
    StaleHandle { expected: u64, found: u64 },

    #[error("unsupported on this device: {0}")]
    Unsupported(String),

    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("device failure 0x{status:08X}: {context}")]
    Fatal { status: u32, context: String },
}

impl ComputeError {
    /// True for device-removed and device-reset, which are recovered by
    /// recreating every device object.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, Self::DeviceRemoved | Self::DeviceReset)
    }

    /// True when the device lacks a feature.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Underlying status code.
    pub fn status(&self) -> u32 {
        match self {
            Self::DeviceRemoved => status::DEVICE_REMOVED,
            Self::DeviceReset => status::DEVICE_RESET,
            Self::StaleHandle { .. } => status::STALE_HANDLE,
            Self::Unsupported(_) => status::UNSUPPORTED,
            Self::BufferSizeMismatch { .. } | Self::InvalidInput(_) => status::INVALID_ARG,
            Self::Fatal { status, .. } => *status,
        }
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_lost_classification() {
        assert!(ComputeError::DeviceRemoved.is_device_lost());
        assert!(ComputeError::DeviceReset.is_device_lost());
        assert!(!ComputeError::Unsupported("histogram".into()).is_device_lost());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ComputeError::DeviceRemoved.status(), status::DEVICE_REMOVED);
        let fatal = ComputeError::Fatal { status: 0x8007_000E, context: "out of memory".into() };
        assert_eq!(fatal.status(), 0x8007_000E);
        assert!(fatal.to_string().contains("0x8007000E"));
    }
}
