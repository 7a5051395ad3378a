//! Pipeline controller: image load, device resources, drawing.
//!
//! The controller owns the device, the effect graph and every device handle.
//! CPU-side state (image info, CLL, render options, view) survives device
//! loss. Device-lost errors are recovered here by recreating the device and
//! all of its objects, then retrying the failed operation once. Any other
//! device error is returned with its status code.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::graph::{EffectGraph, GraphInputs, RenderMode};
use crate::histogram::HistogramAnalyzer;
use crate::params::{RenderContext, SourceEncoding};
use crate::resources::GpuArena;
use crate::state::{PipelineState, RenderOptions};
use crate::view::{Manipulation, ViewState};
use hdrv_compute::{ComputeError, ComputeImage, GpuDevice};
use hdrv_core::{AdvancedColorKind, DecodedImage, DisplayColorInfo, ImageCLL, ImageInfo, ImageSummary, LoadResult};
use hdrv_primaries::GamutTransforms;
use tracing::{debug, info, warn};

/// Readback value when CPU readback is disabled or out of range.
pub const NO_PIXEL: [f32; 4] = [-1.0; 4];

/// CPU copies of the current image, kept for re-upload after device loss.
#[derive(Debug)]
struct LoadedImage {
    source: ComputeImage,
    gain_map: Option<ComputeImage>,
    encoding: SourceEncoding,
}

/// Coordinates classification, graph construction, CLL analysis and drawing.
///
/// ```rust
/// use hdrv_compute::CpuDevice;
/// use hdrv_core::{AdvancedColorKind, DecodedImage, PixelFormat};
/// use hdrv_pipeline::{PipelineConfig, PipelineController, PipelineState};
///
/// let mut ctl = PipelineController::new(CpuDevice::new(), PipelineConfig::default()).unwrap();
/// ctl.set_target_size(16, 16).unwrap();
/// let image = DecodedImage::solid(PixelFormat::RGBA8, 5, 5, [0.5, 0.5, 0.5, 1.0]);
/// assert!(ctl.load_image(image).unwrap().is_valid());
/// ctl.fit_to_window(true).unwrap();
/// ctl.draw().unwrap();
/// assert_eq!(ctl.state(), PipelineState::Ready);
/// assert_eq!(ctl.image_info().kind(), AdvancedColorKind::StandardDynamicRange);
/// assert!(!ctl.image_cll().is_known());
/// ```
pub struct PipelineController<D: GpuDevice> {
    device: D,
    config: PipelineConfig,
    analyzer: HistogramAnalyzer,
    state: PipelineState,
    info: ImageInfo,
    cll: ImageCLL,
    image: Option<LoadedImage>,
    display: Option<DisplayColorInfo>,
    gamut: Option<GamutTransforms>,
    options: RenderOptions,
    view: ViewState,
    graph: Option<EffectGraph>,
    arena: Option<GpuArena<D>>,
    cpu_readback: bool,
    readback: Option<ComputeImage>,
}

impl<D: GpuDevice> PipelineController<D> {
    /// Creates a controller with no image and an unknown display.
    ///
    /// Fails with [`PipelineError::Config`] when the configuration does not
    /// validate.
    pub fn new(device: D, config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let analyzer = HistogramAnalyzer::new(config.histogram.clone());
        Ok(Self {
            device,
            config,
            analyzer,
            state: PipelineState::Uninitialized,
            info: ImageInfo::invalid(),
            cll: ImageCLL::UNKNOWN,
            image: None,
            display: None,
            gamut: None,
            options: RenderOptions::default(),
            view: ViewState::default(),
            graph: None,
            arena: None,
            cpu_readback: false,
            readback: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn image_info(&self) -> &ImageInfo {
        &self.info
    }

    pub fn image_cll(&self) -> ImageCLL {
        self.cll
    }

    /// Current graph, `None` until an image is loaded.
    pub fn graph(&self) -> Option<&EffectGraph> {
        self.graph.as_ref()
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn display_info(&self) -> Option<&DisplayColorInfo> {
        self.display.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Text summary of the loaded image.
    pub fn summary(&self) -> ImageSummary<'_> {
        ImageSummary::new(&self.info, &self.cll)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Validates, classifies and uploads an image.
    ///
    /// A rejected image is not an error: the result is
    /// [`LoadResult::Invalid`] and the state becomes
    /// [`PipelineState::LoadFailed`]. CLL stays unknown until
    /// [`fit_to_window`](Self::fit_to_window) runs with `first_load`.
    pub fn load_image(&mut self, image: DecodedImage) -> PipelineResult<LoadResult> {
        self.state = PipelineState::Uninitialized;
        self.release_resources();
        self.graph = None;
        self.image = None;
        self.readback = None;
        self.info = ImageInfo::invalid();
        self.cll = ImageCLL::UNKNOWN;

        let result = LoadResult::inspect(&image);
        let loaded = match &result {
            LoadResult::Valid(_) => Self::prepare(&image),
            LoadResult::Invalid(reason) => Err(reason.clone()),
        };
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(reason) => {
                warn!(%reason, "image rejected");
                self.state = PipelineState::LoadFailed;
                return Ok(LoadResult::Invalid(reason));
            }
        };

        self.info = result.info();
        info!(
            kind = %self.info.kind(),
            width = self.info.width(),
            height = self.info.height(),
            bpc = self.info.bits_per_channel(),
            float = self.info.is_float(),
            gain_map = self.info.has_gain_map(),
            source = loaded.encoding.label(),
            "image loaded"
        );
        self.image = Some(loaded);
        self.state = PipelineState::NeedsGpuResources;
        self.recovering(|ctl| ctl.ensure_resources())?;
        Ok(result)
    }

    fn prepare(image: &DecodedImage) -> Result<LoadedImage, String> {
        let source = ComputeImage::from_rgba(image.pixels.clone(), image.width, image.height)
            .map_err(|e| e.to_string())?;
        let gain_map = image
            .gain_map
            .as_ref()
            .map(|g| ComputeImage::from_luma(&g.data, g.width, g.height))
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(LoadedImage { source, gain_map, encoding: SourceEncoding::from_image(image) })
    }

    /// Sets the display snapshot, `None` for an unknown display.
    ///
    /// Degenerate primaries are rejected and the previous snapshot kept.
    pub fn set_display_info(&mut self, display: Option<DisplayColorInfo>) -> PipelineResult<()> {
        self.gamut = match &display {
            Some(d) => Some(GamutTransforms::for_display(d)?),
            None => None,
        };
        self.display = display;
        debug!(
            kind = ?self.display.map(|d| d.kind),
            max_nits = self.display.map(|d| d.max_luminance_nits),
            "display info updated"
        );
        self.reconfigure()
    }

    pub fn set_render_options(&mut self, options: RenderOptions) -> PipelineResult<()> {
        self.options = options;
        self.reconfigure()
    }

    /// Resizes the render target. Call [`fit_to_window`](Self::fit_to_window)
    /// afterwards to refit the image.
    pub fn set_target_size(&mut self, width: u32, height: u32) -> PipelineResult<()> {
        self.view.target_size = (width, height);
        self.recovering(|ctl| Ok(ctl.device.resize_target(width, height)?))
    }

    /// Letterboxes the image in the target. With `first_load` the CLL is
    /// measured, otherwise the previous value is kept.
    pub fn fit_to_window(&mut self, first_load: bool) -> PipelineResult<ImageCLL> {
        if !self.state.has_image() {
            return Ok(self.cll);
        }
        if !self.view.fit(self.info.size(), &self.config.view) {
            debug!(target = ?self.view.target_size, "fit skipped, empty target");
            return Ok(self.cll);
        }
        if first_load {
            self.cll = self.recovering(|ctl| ctl.compute_cll())?;
            info!(max = %self.cll.max_label(), median = %self.cll.median_label(), "content light level");
        }
        Ok(self.cll)
    }

    /// Pans/zooms the image, or moves the sphere projection in sphere mode.
    pub fn update_manipulation(&mut self, m: Manipulation) -> PipelineResult<()> {
        let sphere = self.options.mode == RenderMode::SphereMap;
        self.view.manipulate(&m, sphere, &self.config.view);
        self.redraw()
    }

    /// Enables pixel readback after each draw and redraws.
    pub fn set_cpu_readback(&mut self, enabled: bool) -> PipelineResult<()> {
        self.cpu_readback = enabled;
        if !enabled {
            self.readback = None;
        }
        debug!(enabled, "cpu readback");
        self.draw()
    }

    /// Pixel of the last frame, [`NO_PIXEL`] when readback is off.
    pub fn pixel_color(&self, x: u32, y: u32) -> [f32; 4] {
        self.readback
            .as_ref()
            .filter(|_| self.cpu_readback)
            .and_then(|img| img.get_pixel(x, y))
            .unwrap_or(NO_PIXEL)
    }

    /// Reads the render target.
    pub fn target_output(&mut self) -> PipelineResult<ComputeImage> {
        self.recovering(|ctl| Ok(ctl.device.read_target()?))
    }

    /// Drops device objects after the platform reports device loss.
    ///
    /// The next draw recreates the device and everything on it.
    pub fn notify_device_lost(&mut self) {
        if self.state == PipelineState::Ready {
            self.state = PipelineState::NeedsGpuResources;
        }
        self.release_resources();
        warn!(device = self.device.name(), "device lost");
    }

    /// Renders and presents a frame. Without a valid image the target is
    /// cleared to black.
    pub fn draw(&mut self) -> PipelineResult<()> {
        self.recovering(|ctl| ctl.draw_once())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn draw_once(&mut self) -> PipelineResult<()> {
        if !self.state.has_image() {
            self.device.present(None, (0.0, 0.0))?;
        } else {
            self.ensure_resources()?;
            let (Some(graph), Some(arena), Some(image)) = (&self.graph, &self.arena, &self.image) else {
                return Err(PipelineError::NotLoaded);
            };
            let ctx = RenderContext {
                info: &self.info,
                cll: self.cll,
                source: &image.encoding,
                display: self.display.as_ref(),
                options: &self.options,
                view: &self.view,
                config: &self.config,
                gamut: self.gamut.as_ref(),
            };
            let out = arena.render(&mut self.device, graph, &ctx)?;
            self.device.present(Some(&out), self.view.offset)?;
        }

        if self.cpu_readback {
            self.readback = Some(self.device.read_target()?);
        }
        Ok(())
    }

    fn compute_cll(&mut self) -> PipelineResult<ImageCLL> {
        if self.info.kind() != AdvancedColorKind::HighDynamicRange {
            return Ok(ImageCLL::UNKNOWN);
        }
        self.ensure_resources()?;
        let (Some(graph), Some(arena), Some(image)) = (&self.graph, &self.arena, &self.image) else {
            return Err(PipelineError::NotLoaded);
        };
        let ctx = RenderContext {
            info: &self.info,
            cll: ImageCLL::UNKNOWN,
            source: &image.encoding,
            display: self.display.as_ref(),
            options: &self.options,
            view: &self.view,
            config: &self.config,
            gamut: self.gamut.as_ref(),
        };
        let measured = arena.measure(&mut self.device, graph, &ctx, &self.analyzer)?;
        Ok(measured.unwrap_or(ImageCLL::UNKNOWN))
    }

    fn graph_inputs(&self) -> GraphInputs {
        GraphInputs {
            mode: self.options.mode,
            display_hdr: self.display.is_none_or(|d| d.is_hdr()),
            tonemap_supported: self.device.caps().hdr_tonemap,
            has_gain_map: self.info.has_gain_map(),
            constrain_gamut: self.options.constrain_gamut && self.gamut.is_some(),
        }
    }

    /// Rebuilds the graph when its inputs changed, recreating stage effects.
    fn rebuild_graph(&mut self) -> PipelineResult<()> {
        let inputs = self.graph_inputs();
        if self.graph.as_ref().is_some_and(|g| *g.inputs() == inputs) {
            return Ok(());
        }
        let graph = EffectGraph::build(&inputs);
        debug!(mode = %inputs.mode, stages = graph.stages().len(), output = %graph.output(), "graph rebuilt");
        if let Some(arena) = &mut self.arena {
            arena.create_effects(&mut self.device, &graph)?;
        }
        self.graph = Some(graph);
        Ok(())
    }

    /// Creates the device objects if they are missing.
    fn ensure_resources(&mut self) -> PipelineResult<()> {
        if self.state != PipelineState::NeedsGpuResources {
            return Ok(());
        }
        if let Err(e) = self.device.check() {
            if !e.is_device_lost() {
                return Err(e.into());
            }
            self.device.recover()?;
        }
        self.rebuild_graph()?;
        let (Some(graph), Some(image)) = (&self.graph, &self.image) else {
            return Err(PipelineError::NotLoaded);
        };
        let arena = GpuArena::create(&mut self.device, graph, &image.source, image.gain_map.as_ref())?;
        debug!(?arena, "device resources created");
        self.arena = Some(arena);
        self.state = PipelineState::Ready;
        Ok(())
    }

    fn release_resources(&mut self) {
        self.arena = None;
    }

    /// Drops everything on the device, recreates the device and rebuilds.
    fn recover_device(&mut self) -> PipelineResult<()> {
        self.notify_device_lost();
        self.device.recover()?;
        let (w, h) = self.view.target_size;
        self.device.resize_target(w, h)?;
        if self.state.has_image() {
            self.ensure_resources()?;
        }
        info!(device = self.device.name(), "device recovered");
        Ok(())
    }

    /// Runs `op`, recovering from device loss and retrying once.
    fn recovering<T>(&mut self, mut op: impl FnMut(&mut Self) -> PipelineResult<T>) -> PipelineResult<T> {
        match op(self) {
            Err(PipelineError::Compute(e)) if e.is_device_lost() || is_stale(&e) => {
                warn!(error = %e, "device lost during operation, recovering");
                self.recover_device()?;
                op(self)
            }
            other => other,
        }
    }

    /// Applies changed options or display state and redraws.
    fn reconfigure(&mut self) -> PipelineResult<()> {
        if self.state.has_image() {
            self.recovering(|ctl| ctl.rebuild_graph())?;
        }
        self.redraw()
    }

    fn redraw(&mut self) -> PipelineResult<()> {
        if self.state.has_image() { self.draw() } else { Ok(()) }
    }
}

fn is_stale(e: &ComputeError) -> bool {
    matches!(e, ComputeError::StaleHandle { .. })
}

impl<D: GpuDevice + std::fmt::Debug> std::fmt::Debug for PipelineController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController")
            .field("device", &self.device)
            .field("state", &self.state)
            .field("kind", &self.info.kind())
            .field("cll", &self.cll)
            .field("options", &self.options)
            .field("graph", &self.graph.as_ref().map(|g| g.stage_ids()))
            .finish()
    }
}
