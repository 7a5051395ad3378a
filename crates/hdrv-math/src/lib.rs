//! # hdrv-math
//!
//! Exact 3x3 linear algebra for color transforms.
//!
//! - [`Mat3`] - row-major matrix with cofactor inverse
//! - [`Vec3`] - RGB / XYZ triple
//! - [`adapt`] - Bradford chromatic adaptation
//!
//! Every transform in the viewer pipeline is a 3x3 matrix applied to linear
//! RGB.

#![warn(missing_docs)]

pub mod adapt;
mod mat3;
mod vec3;

pub use adapt::{bradford, D50, D65};
pub use mat3::Mat3;
pub use vec3::Vec3;
