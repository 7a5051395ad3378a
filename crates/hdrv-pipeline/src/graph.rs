//! Effect graph construction.
//!
//! The graph for each render mode is declared once in [`EffectGraph::build`],
//! a pure function of [`GraphInputs`]. Stages are stored in execution order,
//! so every stage's inputs appear before it.
//!
//! ```text
//! source > color-management > [gain-map-merge] > white-scale > ...
//!
//! None            ... white-scale
//! HdrTonemap      ... white-scale > tonemap [> sdr-white-scale]
//! SdrOverlay      ... [gain-map-merge] > sdr-overlay > white-scale
//! SphereMap       ... white-scale > border-wrap > sphere-map
//! + gamut         ... > gamut-to-panel > gamut-to-scene
//! ```

use hdrv_compute::KernelKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-selected visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Color managed image, no tonemapping.
    #[default]
    None,
    /// Tonemap onto the display's peak luminance.
    HdrTonemap,
    /// Grey out SDR-range pixels.
    SdrOverlay,
    /// False color luminance.
    LuminanceHeatmap,
    /// Mark pixels above the display peak.
    MaxLuminance,
    /// Project a 360 panorama onto a sphere.
    SphereMap,
}

impl RenderMode {
    /// Every mode.
    pub const fn all() -> &'static [Self] {
        &[
            Self::None,
            Self::HdrTonemap,
            Self::SdrOverlay,
            Self::LuminanceHeatmap,
            Self::MaxLuminance,
            Self::SphereMap,
        ]
    }

    /// Short name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HdrTonemap => "tonemap",
            Self::SdrOverlay => "sdr-overlay",
            Self::LuminanceHeatmap => "heatmap",
            Self::MaxLuminance => "max-luminance",
            Self::SphereMap => "sphere",
        }
    }

    /// Modes that visualize the image before brightness is applied.
    pub const fn is_visualization(self) -> bool {
        matches!(self, Self::SdrOverlay | Self::LuminanceHeatmap | Self::MaxLuminance)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::all().iter().map(|m| m.name()).collect();
                format!("unknown render mode '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Graph stage identity. Device effects are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    ColorManagement,
    GainMapMerge,
    WhiteScale,
    Tonemap,
    SdrWhiteScale,
    SdrOverlay,
    LuminanceHeatmap,
    MaxLuminance,
    BorderWrap,
    SphereMap,
    GamutToPanel,
    GamutToScene,
}

impl StageId {
    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ColorManagement => "color-management",
            Self::GainMapMerge => "gain-map-merge",
            Self::WhiteScale => "white-scale",
            Self::Tonemap => "tonemap",
            Self::SdrWhiteScale => "sdr-white-scale",
            Self::SdrOverlay => "sdr-overlay",
            Self::LuminanceHeatmap => "luminance-heatmap",
            Self::MaxLuminance => "max-luminance",
            Self::BorderWrap => "border-wrap",
            Self::SphereMap => "sphere-map",
            Self::GamutToPanel => "gamut-to-panel",
            Self::GamutToScene => "gamut-to-scene",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a stage reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeInput {
    /// The uploaded image.
    Source,
    /// The uploaded gain map.
    GainMap,
    /// Output of another stage.
    Stage(StageId),
}

impl fmt::Display for NodeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::GainMap => f.write_str("gain-map"),
            Self::Stage(id) => id.fmt(f),
        }
    }
}

/// One wired stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNode {
    /// Identity.
    pub id: StageId,
    /// Effect kind the device creates for it.
    pub kind: KernelKind,
    /// Inputs in kernel order.
    pub inputs: Vec<NodeInput>,
}

impl StageNode {
    fn new(id: StageId, kind: KernelKind, inputs: Vec<NodeInput>) -> Self {
        Self { id, kind, inputs }
    }
}

/// Everything the topology depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GraphInputs {
    /// Render mode.
    pub mode: RenderMode,
    /// Current display is in HDR mode.
    pub display_hdr: bool,
    /// Device has a luminance tonemapper.
    pub tonemap_supported: bool,
    /// Image carries a gain map.
    pub has_gain_map: bool,
    /// Gamut constraint stages are appended.
    pub constrain_gamut: bool,
}

/// Stage DAG with one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectGraph {
    inputs: GraphInputs,
    stages: Vec<StageNode>,
    output: StageId,
}

impl EffectGraph {
    /// Builds the graph for `inputs`.
    pub fn build(inputs: &GraphInputs) -> Self {
        use NodeInput::Stage;
        let mut b = Builder::default();

        let mut merged = b.push(StageId::ColorManagement, KernelKind::ColorManagement, vec![NodeInput::Source]);
        if inputs.has_gain_map {
            merged = b.push(StageId::GainMapMerge, KernelKind::GainMapMerge, vec![Stage(merged), NodeInput::GainMap]);
        }

        let output = match inputs.mode {
            RenderMode::None => b.push(StageId::WhiteScale, KernelKind::ColorMatrix, vec![Stage(merged)]),
            RenderMode::HdrTonemap => {
                let white = b.push(StageId::WhiteScale, KernelKind::ColorMatrix, vec![Stage(merged)]);
                let kind = if inputs.tonemap_supported {
                    KernelKind::HdrTonemap
                } else {
                    KernelKind::SimpleTonemap
                };
                let tonemapped = b.push(StageId::Tonemap, kind, vec![Stage(white)]);
                if inputs.display_hdr {
                    tonemapped
                } else {
                    b.push(StageId::SdrWhiteScale, KernelKind::WhiteLevelAdjust, vec![Stage(tonemapped)])
                }
            }
            RenderMode::SdrOverlay | RenderMode::LuminanceHeatmap | RenderMode::MaxLuminance => {
                let (id, kind) = match inputs.mode {
                    RenderMode::SdrOverlay => (StageId::SdrOverlay, KernelKind::SdrOverlay),
                    RenderMode::LuminanceHeatmap => (StageId::LuminanceHeatmap, KernelKind::LuminanceHeatmap),
                    _ => (StageId::MaxLuminance, KernelKind::MaxLuminance),
                };
                let viz = b.push(id, kind, vec![Stage(merged)]);
                b.push(StageId::WhiteScale, KernelKind::ColorMatrix, vec![Stage(viz)])
            }
            RenderMode::SphereMap => {
                let white = b.push(StageId::WhiteScale, KernelKind::ColorMatrix, vec![Stage(merged)]);
                let wrapped = b.push(StageId::BorderWrap, KernelKind::BorderWrap, vec![Stage(white)]);
                b.push(StageId::SphereMap, KernelKind::SphereMap, vec![Stage(wrapped)])
            }
        };

        let output = if inputs.constrain_gamut {
            let panel = b.push(StageId::GamutToPanel, KernelKind::ColorMatrix, vec![Stage(output)]);
            b.push(StageId::GamutToScene, KernelKind::ColorMatrix, vec![Stage(panel)])
        } else {
            output
        };

        Self { inputs: *inputs, stages: b.stages, output }
    }

    /// Inputs the graph was built from.
    pub fn inputs(&self) -> &GraphInputs {
        &self.inputs
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[StageNode] {
        &self.stages
    }

    /// Stage identities in execution order.
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id).collect()
    }

    /// Final output stage.
    pub fn output(&self) -> StageId {
        self.output
    }

    /// Looks up a stage.
    pub fn stage(&self, id: StageId) -> Option<&StageNode> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// True if the graph has the stage.
    pub fn contains(&self, id: StageId) -> bool {
        self.stage(id).is_some()
    }

    /// Stage whose output feeds the histogram: merged, pre white-scale.
    pub fn histogram_tap(&self) -> StageId {
        if self.contains(StageId::GainMapMerge) {
            StageId::GainMapMerge
        } else {
            StageId::ColorManagement
        }
    }
}

impl fmt::Display for EffectGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            let inputs: Vec<String> = stage.inputs.iter().map(|i| i.to_string()).collect();
            let marker = if stage.id == self.output { " (output)" } else { "" };
            writeln!(f, "{:<18} [{}] <- {}{}", stage.id.name(), stage.kind, inputs.join(", "), marker)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Builder {
    stages: Vec<StageNode>,
}

impl Builder {
    fn push(&mut self, id: StageId, kind: KernelKind, inputs: Vec<NodeInput>) -> StageId {
        self.stages.push(StageNode::new(id, kind, inputs));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageId::*;

    fn inputs(mode: RenderMode) -> GraphInputs {
        GraphInputs { mode, display_hdr: true, tonemap_supported: true, has_gain_map: false, constrain_gamut: false }
    }

    #[test]
    fn test_none() {
        let g = EffectGraph::build(&inputs(RenderMode::None));
        assert_eq!(g.stage_ids(), vec![ColorManagement, WhiteScale]);
        assert_eq!(g.output(), WhiteScale);
        assert_eq!(g.histogram_tap(), ColorManagement);
    }

    #[test]
    fn test_gain_map_merge_inserted() {
        let g = EffectGraph::build(&GraphInputs { has_gain_map: true, ..inputs(RenderMode::None) });
        assert_eq!(g.stage_ids(), vec![ColorManagement, GainMapMerge, WhiteScale]);
        let merge = g.stage(GainMapMerge).unwrap();
        assert_eq!(merge.inputs, vec![NodeInput::Stage(ColorManagement), NodeInput::GainMap]);
        assert_eq!(g.histogram_tap(), GainMapMerge);
    }

    #[test]
    fn test_tonemap_display_dependent() {
        let hdr = EffectGraph::build(&inputs(RenderMode::HdrTonemap));
        assert_eq!(hdr.stage_ids(), vec![ColorManagement, WhiteScale, Tonemap]);
        assert_eq!(hdr.output(), Tonemap);

        let sdr = EffectGraph::build(&GraphInputs { display_hdr: false, ..inputs(RenderMode::HdrTonemap) });
        assert_eq!(sdr.stage_ids(), vec![ColorManagement, WhiteScale, Tonemap, SdrWhiteScale]);
        assert_eq!(sdr.output(), SdrWhiteScale);
    }

    #[test]
    fn test_tonemap_fallback_kind() {
        let g = EffectGraph::build(&GraphInputs { tonemap_supported: false, ..inputs(RenderMode::HdrTonemap) });
        assert_eq!(g.stage(Tonemap).unwrap().kind, KernelKind::SimpleTonemap);
    }

    #[test]
    fn test_visualizations_precede_white_scale() {
        for (mode, viz) in [
            (RenderMode::SdrOverlay, SdrOverlay),
            (RenderMode::LuminanceHeatmap, LuminanceHeatmap),
            (RenderMode::MaxLuminance, MaxLuminance),
        ] {
            let g = EffectGraph::build(&GraphInputs { has_gain_map: true, ..inputs(mode) });
            assert_eq!(g.stage_ids(), vec![ColorManagement, GainMapMerge, viz, WhiteScale]);
            assert_eq!(g.stage(viz).unwrap().inputs, vec![NodeInput::Stage(GainMapMerge)]);
            assert_eq!(g.output(), WhiteScale);
        }
    }

    #[test]
    fn test_sphere_map() {
        let g = EffectGraph::build(&inputs(RenderMode::SphereMap));
        assert_eq!(g.stage_ids(), vec![ColorManagement, WhiteScale, BorderWrap, SphereMap]);
        assert_eq!(g.output(), SphereMap);
    }

    #[test]
    fn test_gamut_stages_appended_last() {
        for &mode in RenderMode::all() {
            let plain = EffectGraph::build(&inputs(mode));
            let g = EffectGraph::build(&GraphInputs { constrain_gamut: true, ..inputs(mode) });
            let ids = g.stage_ids();
            assert_eq!(&ids[ids.len() - 2..], &[GamutToPanel, GamutToScene]);
            assert_eq!(g.stage(GamutToPanel).unwrap().inputs, vec![NodeInput::Stage(plain.output())]);
            assert_eq!(g.output(), GamutToScene);
        }
    }

    #[test]
    fn test_inputs_precede_consumers() {
        for &mode in RenderMode::all() {
            for bits in 0..16u8 {
                let gi = GraphInputs {
                    mode,
                    display_hdr: bits & 1 != 0,
                    tonemap_supported: bits & 2 != 0,
                    has_gain_map: bits & 4 != 0,
                    constrain_gamut: bits & 8 != 0,
                };
                let g = EffectGraph::build(&gi);
                for (i, stage) in g.stages().iter().enumerate() {
                    for input in &stage.inputs {
                        if let NodeInput::Stage(id) = input {
                            let pos = g.stages().iter().position(|s| s.id == *id).unwrap();
                            assert!(pos < i, "{mode}: {} reads {} before it runs", stage.id, id);
                        }
                    }
                }
                assert_eq!(g, EffectGraph::build(&gi));
            }
        }
    }

    #[test]
    fn test_mode_names() {
        for &mode in RenderMode::all() {
            assert_eq!(mode.name().parse::<RenderMode>().unwrap(), mode);
        }
        assert!("bogus".parse::<RenderMode>().is_err());
    }
}
