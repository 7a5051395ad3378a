//! # hdrv-pipeline
//!
//! HDR/WCG color pipeline and HDR metadata engine.
//!
//! - [`HistogramAnalyzer`] - percentile max/median content light level
//! - [`white_level_scale`] - SDR reference white and exposure multiplier
//! - [`EffectGraph`] - stage graph per render mode
//! - [`RenderContext`] - stage parameters from immutable snapshots
//! - [`PipelineController`] - load, device recovery and drawing
//!
//! ## Flow
//!
//! ```text
//! DecodedImage -> load_image -> LoadResult (classified ImageInfo)
//!                    |
//!              fit_to_window(first_load) -> ImageCLL (histogram pass)
//!                    |
//!   draw: source > color-management > [gain-map-merge] > ... > present
//! ```
//!
//! Interaction (pan, zoom, exposure, mode) only recomputes stage parameters
//! or rebuilds the graph. The histogram pass runs once per image.
//!
//! ## Example
//!
//! ```rust
//! use hdrv_compute::CpuDevice;
//! use hdrv_core::{DecodedImage, DisplayColorInfo, PixelFormat};
//! use hdrv_pipeline::{PipelineConfig, PipelineController, RenderMode, RenderOptions, StageId};
//!
//! let mut ctl = PipelineController::new(CpuDevice::new(), PipelineConfig::default()).unwrap();
//! ctl.set_target_size(64, 64).unwrap();
//! ctl.set_display_info(Some(DisplayColorInfo::wcg())).unwrap();
//! ctl.load_image(DecodedImage::solid(PixelFormat::RGBA32F, 8, 8, [4.0, 4.0, 4.0, 1.0])).unwrap();
//! ctl.fit_to_window(true).unwrap();
//! ctl.set_render_options(RenderOptions::default().with_mode(RenderMode::HdrTonemap)).unwrap();
//! assert!(ctl.graph().unwrap().contains(StageId::SdrWhiteScale));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod histogram;
pub mod params;
pub mod resources;
pub mod state;
pub mod view;
pub mod white_level;

pub use config::{DisplayConfig, GainMapConfig, HistogramConfig, PipelineConfig, ViewConfig};
pub use controller::{PipelineController, NO_PIXEL};
pub use error::{PipelineError, PipelineResult};
pub use graph::{EffectGraph, GraphInputs, NodeInput, RenderMode, StageId, StageNode};
pub use histogram::{AnalysisEffects, HistogramAnalyzer};
pub use params::{RenderContext, SourceEncoding};
pub use resources::GpuArena;
pub use state::{PipelineState, RenderOptions};
pub use view::{Manipulation, ViewState};
pub use white_level::{exposure_from_slider, format_exposure, slider_from_exposure, white_level_scale, WhiteLevelInput};
