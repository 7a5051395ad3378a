//! # hdrv-core
//!
//! Core types for the hdrv HDR/WCG image viewer pipeline.
//!
//! - [`AdvancedColorKind`] and [`classify`] - SDR / WCG / HDR classification
//! - [`ImageInfo`], [`LoadResult`] - validated per-image properties
//! - [`ImageCLL`] - estimated content light level
//! - [`DisplayColorInfo`] - current display capabilities
//! - [`DecodedImage`] - what an external loader hands to the pipeline
//!
//! ## Crate Structure
//!
//! ```text
//! hdrv-core (this crate)
//!    ^
//!    +-- hdrv-primaries (gamut matrices)
//!    +-- hdrv-compute (device abstraction, CPU device)
//!    +-- hdrv-pipeline (histogram, white level, effect graph, controller)
//!    +-- hdrv-cli
//! ```
//!
//! ## Luminance convention
//!
//! Working values are scRGB: linear BT.709 primaries where 1.0 is
//! [`NOMINAL_WHITE_NITS`] (80 nits).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cll;
pub mod consts;
pub mod display;
pub mod error;
pub mod format;
pub mod info;
pub mod kind;
pub mod source;
pub mod summary;

pub use cll::{nits_label, ImageCLL};
pub use consts::*;
pub use display::{Chromaticity, DisplayColorInfo};
pub use error::{Error, Result};
pub use format::PixelFormat;
pub use info::{ImageInfo, ImageInfoBuilder, LoadResult};
pub use kind::{classify, AdvancedColorKind, ClassifierInput};
pub use source::{DecodedImage, EmbeddedProfile, GainMap};
pub use summary::ImageSummary;

/// Prelude module for convenient imports.
///
/// ```
/// use hdrv_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cll::ImageCLL;
    pub use crate::display::DisplayColorInfo;
    pub use crate::error::{Error, Result};
    pub use crate::format::PixelFormat;
    pub use crate::info::{ImageInfo, LoadResult};
    pub use crate::kind::AdvancedColorKind;
    pub use crate::source::{DecodedImage, GainMap};
}
