//! Pipeline errors.
//!
//! Only unrecoverable conditions reach the caller. Malformed images are
//! reported as [`LoadResult::Invalid`](hdrv_core::LoadResult::Invalid) and
//! device loss is recovered inside the controller.

use hdrv_compute::ComputeError;
use hdrv_primaries::GamutError;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Device failure that recovery could not handle.
    #[error("device error: {0}")]
    Compute(#[from] ComputeError),

    /// Display primaries cannot form a gamut transform.
    #[error("gamut error: {0}")]
    Gamut(#[from] GamutError),

    /// Configuration rejected.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation requires a loaded image.
    #[error("no image loaded")]
    NotLoaded,
}

impl PipelineError {
    /// Status code of an underlying device error.
    pub fn status(&self) -> Option<u32> {
        match self {
            Self::Compute(e) => Some(e.status()),
            _ => None,
        }
    }
}
