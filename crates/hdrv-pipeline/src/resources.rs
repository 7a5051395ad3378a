//! Device-dependent objects of one loaded image.
//!
//! The arena owns every handle created on the device: the uploaded images,
//! one effect per graph stage and the analysis effects. It is dropped and
//! recreated as a whole after device loss, never patched.

use crate::graph::{EffectGraph, NodeInput, StageId};
use crate::histogram::{AnalysisEffects, HistogramAnalyzer};
use crate::params::RenderContext;
use hdrv_compute::{ComputeError, ComputeImage, ComputeResult, GpuDevice, Kernel, KernelKind};
use hdrv_core::ImageCLL;
use std::collections::BTreeMap;
use tracing::debug;

/// Handles keyed by stage.
pub struct GpuArena<D: GpuDevice> {
    source: D::Image,
    gain_map: Option<D::Image>,
    effects: BTreeMap<StageId, D::Effect>,
    analysis: Option<AnalysisEffects<D>>,
    zoom: D::Effect,
}

impl<D: GpuDevice> GpuArena<D> {
    /// Uploads the images and creates effects for `graph`.
    pub fn create(
        device: &mut D,
        graph: &EffectGraph,
        source: &ComputeImage,
        gain_map: Option<&ComputeImage>,
    ) -> ComputeResult<Self> {
        let source = device.upload(source)?;
        let gain_map = gain_map.map(|g| device.upload(g)).transpose()?;
        let analysis = AnalysisEffects::create(device)?;
        let zoom = device.create_effect(KernelKind::Scale)?;
        let mut arena = Self { source, gain_map, effects: BTreeMap::new(), analysis, zoom };
        arena.create_effects(device, graph)?;
        Ok(arena)
    }

    /// Replaces all stage effects for a rebuilt graph.
    pub fn create_effects(&mut self, device: &mut D, graph: &EffectGraph) -> ComputeResult<()> {
        let mut effects = BTreeMap::new();
        for stage in graph.stages() {
            effects.insert(stage.id, device.create_effect(stage.kind)?);
        }
        self.effects = effects;
        debug!(effects = self.effects.len(), "stage effects created");
        Ok(())
    }

    /// Runs the graph up to and including `target`.
    pub fn evaluate(
        &self,
        device: &mut D,
        graph: &EffectGraph,
        ctx: &RenderContext<'_>,
        target: StageId,
    ) -> ComputeResult<D::Image> {
        let mut outputs: BTreeMap<StageId, D::Image> = BTreeMap::new();
        for stage in graph.stages() {
            let effect = self
                .effects
                .get(&stage.id)
                .ok_or_else(|| ComputeError::InvalidInput(format!("no effect for {}", stage.id)))?;
            let kernel = ctx.kernel(stage);
            let out = {
                let mut inputs = Vec::with_capacity(stage.inputs.len());
                for input in &stage.inputs {
                    inputs.push(self.resolve(*input, &outputs)?);
                }
                device.apply(effect, &kernel, &inputs)?
            };
            if stage.id == target {
                return Ok(out);
            }
            outputs.insert(stage.id, out);
        }
        Err(ComputeError::InvalidInput(format!("{target} is not part of the graph")))
    }

    /// Renders the final output at the view's zoom.
    ///
    /// The sphere projection already renders at scene size.
    pub fn render(&self, device: &mut D, graph: &EffectGraph, ctx: &RenderContext<'_>) -> ComputeResult<D::Image> {
        let out = self.evaluate(device, graph, ctx, graph.output())?;
        let factor = ctx.view.zoom;
        if graph.contains(StageId::SphereMap) || (factor - 1.0).abs() <= f32::EPSILON {
            return Ok(out);
        }
        device.apply(&self.zoom, &Kernel::Scale { factor }, &[&out])
    }

    /// Measures CLL on the histogram tap, `None` without analysis support.
    pub fn measure(
        &self,
        device: &mut D,
        graph: &EffectGraph,
        ctx: &RenderContext<'_>,
        analyzer: &HistogramAnalyzer,
    ) -> ComputeResult<Option<ImageCLL>> {
        let Some(analysis) = &self.analysis else {
            return Ok(None);
        };
        let tap = self.evaluate(device, graph, ctx, graph.histogram_tap())?;
        analyzer.measure(device, analysis, &tap, ctx.info.is_scene_referred()).map(Some)
    }

    fn resolve<'a>(&'a self, input: NodeInput, outputs: &'a BTreeMap<StageId, D::Image>) -> ComputeResult<&'a D::Image> {
        match input {
            NodeInput::Source => Ok(&self.source),
            NodeInput::GainMap => self
                .gain_map
                .as_ref()
                .ok_or_else(|| ComputeError::InvalidInput("graph reads a missing gain map".into())),
            NodeInput::Stage(id) => outputs
                .get(&id)
                .ok_or_else(|| ComputeError::InvalidInput(format!("{id} has not run"))),
        }
    }
}

impl<D: GpuDevice> std::fmt::Debug for GpuArena<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuArena")
            .field("stages", &self.effects.keys().collect::<Vec<_>>())
            .field("gain_map", &self.gain_map.is_some())
            .field("analysis", &self.analysis.is_some())
            .finish()
    }
}
