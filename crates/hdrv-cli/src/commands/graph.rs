//! Graph command: prints the stage list the controller would build.

use crate::GraphArgs;
use anyhow::Result;
use hdrv_pipeline::{EffectGraph, GraphInputs};

pub fn run(args: GraphArgs) -> Result<()> {
    let display = super::parse_display(&args.display, None, None)?;
    let inputs = GraphInputs {
        mode: args.mode,
        display_hdr: display.is_none_or(|d| d.is_hdr()),
        tonemap_supported: !args.no_tonemap_cap,
        has_gain_map: args.gain_map,
        constrain_gamut: !args.no_gamut && display.is_some(),
    };
    let graph = EffectGraph::build(&inputs);
    println!("mode: {}  display: {}  histogram tap: {}", inputs.mode, args.display, graph.histogram_tap());
    print!("{graph}");
    Ok(())
}
