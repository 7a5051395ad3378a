//! CLI command implementations

pub mod graph;
pub mod info;
pub mod render;

use anyhow::{bail, Context, Result};
use hdrv_compute::CpuDevice;
use hdrv_core::DisplayColorInfo;
use hdrv_pipeline::{PipelineConfig, PipelineController};
use std::path::Path;

/// Loads the pipeline config, defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Controller on the CPU device with a target of the given size.
pub fn controller(config: PipelineConfig, size: (u32, u32)) -> Result<PipelineController<CpuDevice>> {
    let mut ctl = PipelineController::new(CpuDevice::new(), config)?;
    ctl.set_target_size(size.0, size.1)?;
    Ok(ctl)
}

/// Display preset by name: sdr, wcg, hdr, or none for an unknown display.
pub fn parse_display(name: &str, peak_nits: Option<f32>, sdr_white: Option<f32>) -> Result<Option<DisplayColorInfo>> {
    let display = match name.to_ascii_lowercase().as_str() {
        "none" | "unknown" => return Ok(None),
        "sdr" => DisplayColorInfo::sdr(),
        "wcg" => DisplayColorInfo::wcg(),
        "hdr" => DisplayColorInfo::hdr(peak_nits.unwrap_or(1000.0)),
        other => bail!("Unknown display '{}', expected sdr, wcg, hdr or none", other),
    };
    let display = match peak_nits {
        Some(nits) => display.with_max_luminance(nits),
        None => display,
    };
    Ok(Some(match sdr_white {
        Some(nits) => display.with_sdr_white(nits),
        None => display,
    }))
}

/// Parses `WxH`.
pub fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s.split_once(['x', 'X']).context("Size must be WxH")?;
    let size = (w.trim().parse()?, h.trim().parse()?);
    if size.0 == 0 || size.1 == 0 {
        bail!("Size must be non-zero, got {}", s);
    }
    Ok(size)
}

/// Parses `X,Y`.
pub fn parse_point(s: &str) -> Result<(u32, u32)> {
    let (x, y) = s.split_once(',').context("Probe must be X,Y")?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}
