//! Render command.
//!
//! Drives the controller the way the viewer does: load, fit, configure and
//! draw, then reads the FP16 target back.

use crate::RenderArgs;
use anyhow::{bail, Context, Result};
use hdrv_pipeline::{PipelineConfig, RenderOptions};
use tracing::{info, trace};

/// Runs the render command.
pub fn run(args: RenderArgs, config: PipelineConfig, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), mode = %args.mode, "render::run");

    let mut image = crate::loader::load(&args.input, args.bt2100)?;
    if let Some(path) = &args.gain_map {
        image = image.with_gain_map(crate::loader::load_gain_map(path)?);
    }
    let size = match &args.size {
        Some(s) => super::parse_size(s)?,
        None => image.size(),
    };
    let probes = args.probe.iter().map(|p| super::parse_point(p)).collect::<Result<Vec<_>>>()?;
    let display = super::parse_display(&args.display, args.peak_nits, args.sdr_white)?;

    let mut ctl = super::controller(config, (size.0.max(1), size.1.max(1)))?;
    ctl.set_display_info(display).context("Display primaries rejected")?;
    let result = ctl.load_image(image)?;
    if let Some(reason) = result.reason() {
        bail!("{}: {}", args.input.display(), reason);
    }
    let cll = ctl.fit_to_window(true)?;

    let options = RenderOptions::default()
        .with_mode(args.mode)
        .with_exposure_stops(args.exposure)
        .with_target_max_nits(args.target_nits)
        .with_constrain_gamut(!args.no_gamut);
    ctl.set_render_options(options)?;
    ctl.set_cpu_readback(!probes.is_empty())?;

    info!(
        kind = %ctl.image_info().kind(),
        max = %cll.max_label(),
        median = %cll.median_label(),
        stages = ctl.graph().map_or(0, |g| g.stages().len()),
        "rendered"
    );
    if verbose {
        print!("{}", ctl.summary());
        if let Some(graph) = ctl.graph() {
            println!("  Graph:");
            for line in graph.to_string().lines() {
                println!("    {line}");
            }
        }
    }

    for (x, y) in probes {
        let [r, g, b, a] = ctl.pixel_color(x, y);
        println!("{x},{y}: {r:.4} {g:.4} {b:.4} {a:.4}");
    }

    if let Some(output) = &args.output {
        let frame = ctl.target_output()?;
        crate::loader::save_png(output, &frame)?;
        if verbose {
            println!("Wrote {}", output.display());
        }
    }
    Ok(())
}
