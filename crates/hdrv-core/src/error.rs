//! Error types for hdrv-core.
//!
//! Image validation failures are normally reported through
//! [`LoadResult::Invalid`](crate::LoadResult::Invalid) rather than through
//! this type; [`Error`] covers the cases where a caller asks for something
//! that cannot be represented at all.
//!
//! # Usage
//!
//! ```rust
//! use hdrv_core::{Error, Result};
//!
//! fn check(width: u32, height: u32) -> Result<()> {
//!     if width == 0 || height == 0 {
//!         return Err(Error::InvalidDimensions { width, height });
//!     }
//!     Ok(())
//! }
//! assert!(check(0, 4).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by core hdrv operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Decoded image cannot be displayed.
    #[error("invalid image: {reason}")]
    InvalidImage {
        /// Human-readable cause
        reason: String,
    },

    /// Width or height is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Configuration value out of range or unparsable.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::InvalidImage`].
    #[inline]
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage { reason: reason.into() }
    }

    /// Creates an [`Error::Config`].
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for image validation failures.
    #[inline]
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, Self::InvalidImage { .. } | Self::InvalidDimensions { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_image("unsupported pixel format");
        assert_eq!(err.to_string(), "invalid image: unsupported pixel format");

        let err = Error::InvalidDimensions { width: 0, height: 12 };
        assert!(err.to_string().contains("0x12"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::invalid_image("x").is_invalid_image());
        assert!(Error::InvalidDimensions { width: 0, height: 0 }.is_invalid_image());
        assert!(!Error::config("bins").is_invalid_image());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
