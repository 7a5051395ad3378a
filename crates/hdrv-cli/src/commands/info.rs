//! Image info command.
//!
//! Classifies each image and measures its content light level with the
//! histogram pass on the CPU device.

use crate::InfoArgs;
use anyhow::Result;
use hdrv_core::ImageInfo;
use hdrv_pipeline::PipelineConfig;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Per-file result of the info command.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub file: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub kind: &'static str,
    pub width: u32,
    pub height: u32,
    pub bits_per_channel: u32,
    pub float: bool,
    pub profiles: u32,
    pub gain_map: bool,
    pub source: String,
    /// `None` when the CLL is unknown.
    pub max_cll_nits: Option<f32>,
    pub median_cll_nits: Option<f32>,
    pub scene_referred: bool,
}

impl InfoReport {
    /// Report for a file the loader could not decode.
    fn unreadable(path: &Path, reason: String) -> Self {
        let info = ImageInfo::invalid();
        Self {
            file: path.display().to_string(),
            valid: false,
            reason: Some(reason),
            kind: info.kind().short_name(),
            width: 0,
            height: 0,
            bits_per_channel: 0,
            float: false,
            profiles: 0,
            gain_map: false,
            source: "none".to_string(),
            max_cll_nits: None,
            median_cll_nits: None,
            scene_referred: false,
        }
    }
}

/// Runs the info command.
pub fn run(args: InfoArgs, config: PipelineConfig, verbose: bool) -> Result<()> {
    trace!(files = args.input.len(), "info::run");
    let mut reports = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let (report, summary) = inspect(path, args.bt2100, &config)?;
        if !args.json {
            println!("{}", path.display());
            print!("{summary}");
            if verbose {
                println!("  Source:      {}", report.source);
            }
            if args.input.len() > 1 {
                println!();
            }
        }
        reports.push(report);
    }

    if args.json {
        let json = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string_pretty(&reports)?
        };
        println!("{json}");
    }
    Ok(())
}

/// Loads one file through the controller. Returns the report and the text
/// summary. A file that fails to decode yields an invalid report.
pub fn inspect(path: &Path, bt2100: bool, config: &PipelineConfig) -> Result<(InfoReport, String)> {
    let image = match crate::loader::load(path, bt2100) {
        Ok(image) => image,
        Err(e) => {
            let reason = format!("{e:#}");
            warn!(file = %path.display(), %reason, "unreadable image");
            let summary = format!("  Invalid:     {reason}\n");
            return Ok((InfoReport::unreadable(path, reason), summary));
        }
    };
    let size = image.size();
    let source = hdrv_pipeline::SourceEncoding::from_image(&image).label().to_string();

    let mut ctl = super::controller(config.clone(), (size.0.max(1), size.1.max(1)))?;
    let result = ctl.load_image(image)?;
    let cll = ctl.fit_to_window(true)?;
    debug!(file = %path.display(), state = %ctl.state(), "inspected");

    let info = ctl.image_info();
    let known = |v: f32| (cll.is_known() && v >= 0.0).then_some(v);
    let report = InfoReport {
        file: path.display().to_string(),
        valid: result.is_valid(),
        reason: result.reason().map(str::to_string),
        kind: info.kind().short_name(),
        width: info.width(),
        height: info.height(),
        bits_per_channel: info.bits_per_channel(),
        float: info.is_float(),
        profiles: info.profile_count(),
        gain_map: info.has_gain_map(),
        source,
        max_cll_nits: known(cll.max_nits),
        median_cll_nits: known(cll.median_nits),
        scene_referred: cll.is_scene_referred,
    };
    Ok((report, ctl.summary().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    #[test]
    fn test_sdr_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdr.png");
        RgbImage::from_pixel(5, 5, Rgb([200, 200, 200])).save(&path).unwrap();

        let (report, summary) = inspect(&path, false, &PipelineConfig::default()).unwrap();
        assert!(report.valid);
        assert_eq!(report.kind, "sdr");
        assert_eq!(report.max_cll_nits, None);
        assert!(summary.contains("Standard Dynamic Range"));
        assert!(summary.contains("N/A"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["max_cll_nits"], serde_json::Value::Null);
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let (report, summary) = inspect(&path, false, &PipelineConfig::default()).unwrap();
        assert!(!report.valid);
        assert!(report.reason.is_some());
        assert_eq!(report.width, 0);
        assert!(summary.contains("Invalid"));
    }

    #[test]
    fn test_hdr_radiance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hdr.hdr");
        ImageBuffer::<Rgb<f32>, _>::from_pixel(6, 4, Rgb([1.0f32, 1.0, 1.0])).save(&path).unwrap();

        let (report, _) = inspect(&path, false, &PipelineConfig::default()).unwrap();
        assert_eq!(report.kind, "hdr");
        assert!(report.float);
        let max = report.max_cll_nits.unwrap();
        assert!((max - 80.0).abs() < 8.0, "max {max}");
        assert!(report.scene_referred);
    }
}
